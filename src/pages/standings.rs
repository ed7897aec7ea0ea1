// 🏆 Standings Extractors - regular season, final standings, owners
//
// Each extractor returns the raw text of the fields it found, one row per
// team, in page order. A row missing any cell it needs is skipped here; the
// season merger decides what an empty result means.

use super::{all_within, element_text, element_text_tight, first_within, href, Page};
use crate::error::Result;
use crate::identity::TeamRef;

/// Markers each standings page must carry to be usable
pub const REGULAR_MARKERS: &[&str] = &["teamName", "teamPts"];
pub const FINAL_MARKERS: &[&str] = &["teamName", "place"];
pub const OWNERS_MARKERS: &[&str] = &["teamName", "userName"];

// ============================================================================
// ROW TYPES
// ============================================================================

/// One team row from the regular-season standings page
#[derive(Debug, Clone, PartialEq)]
pub struct RegularRow {
    pub team: TeamRef,
    pub rank: String,
    pub record: String,
    pub points_for: String,
    pub points_against: String,
}

/// One bracket entry from the final standings page
#[derive(Debug, Clone, PartialEq)]
pub struct PlayoffRow {
    pub team: TeamRef,
    /// e.g. "1st Place"
    pub place_text: String,
}

impl PlayoffRow {
    /// Digits of the leading token ("3rd Place" → "3"); None when it has none
    pub fn playoff_rank(&self) -> Option<String> {
        let token = self.place_text.split_whitespace().next()?;
        let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            None
        } else {
            Some(digits)
        }
    }
}

/// One team row from the owners page
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerRow {
    pub team: TeamRef,
    pub manager: String,
    pub moves: String,
    pub trades: String,
}

// ============================================================================
// EXTRACTORS
// ============================================================================

fn team_ref(link: &scraper::ElementRef) -> TeamRef {
    TeamRef::new(href(link), element_text_tight(link))
}

pub fn extract_regular_standings(page: &Page) -> Result<Vec<RegularRow>> {
    let mut rows = Vec::new();

    for tr in page.select_all("tr[class*='team']")? {
        let rank = first_within(&tr, "span.teamRank")?;
        let link = first_within(&tr, "a.teamName")?;
        let record = first_within(&tr, "td.teamRecord")?;
        let points = all_within(&tr, "td.teamPts")?;

        let (Some(rank), Some(link), Some(record)) = (rank, link, record) else {
            continue;
        };
        if points.len() < 2 {
            continue;
        }

        rows.push(RegularRow {
            team: team_ref(&link),
            rank: element_text_tight(&rank),
            record: element_text_tight(&record),
            points_for: element_text_tight(&points[0]),
            points_against: element_text_tight(&points[1]),
        });
    }

    Ok(rows)
}

pub fn extract_playoffs(page: &Page) -> Result<Vec<PlayoffRow>> {
    let mut rows = Vec::new();

    for li in page.select_all("li[class*='place']")? {
        let place = first_within(&li, "div.place")?;
        let link = first_within(&li, "div.value a.teamName")?;

        let (Some(place), Some(link)) = (place, link) else {
            continue;
        };

        rows.push(PlayoffRow {
            team: team_ref(&link),
            place_text: element_text(&place),
        });
    }

    Ok(rows)
}

pub fn extract_owners(page: &Page) -> Result<Vec<OwnerRow>> {
    let mut rows = Vec::new();

    for tr in page.select_all("tr[class*='team']")? {
        let link = first_within(&tr, "a.teamName")?;
        let manager = first_within(&tr, "span.userName")?;
        let moves = first_within(&tr, "td.teamTransactionCount")?;
        let trades = first_within(&tr, "td.teamTradeCount")?;

        let (Some(link), Some(manager), Some(moves), Some(trades)) = (link, manager, moves, trades)
        else {
            continue;
        };

        rows.push(OwnerRow {
            team: team_ref(&link),
            manager: element_text_tight(&manager),
            moves: element_text_tight(&moves),
            trades: element_text_tight(&trades),
        });
    }

    Ok(rows)
}

/// Number of teams in the league that season (one owners row per team)
pub fn count_owners(page: &Page) -> Result<u32> {
    Ok(page.select_all("tr[class*='team-']")?.len() as u32)
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_extract_regular_standings() {
        let page = Page::parse(
            "u",
            regular_html(&[
                ("3", "Gridiron Gurus", "1", "10-3-0", "1,432.56", "1201.10"),
                ("", "Bye Week Heroes", "2", "9-4-0", "1398.00", "1250.22"),
            ]),
        );
        let rows = extract_regular_standings(&page).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].team.key(), Some("3".to_string()));
        assert_eq!(rows[0].rank, "1");
        assert_eq!(rows[0].record, "10-3-0");
        assert_eq!(rows[0].points_for, "1,432.56");
        assert_eq!(rows[1].team.key(), Some("bye week heroes".to_string()));
    }

    #[test]
    fn test_regular_rows_missing_cells_are_skipped() {
        let html = "<table>\
            <tr class='team-1'><td><span class='teamRank'>1</span><a class='teamName' href='/team/1'>A</a></td>\
            <td class='teamRecord'>1-0-0</td><td class='teamPts'>100</td></tr>\
            </table>";
        let rows = extract_regular_standings(&Page::parse("u", html)).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_extract_playoffs_and_rank() {
        let page = Page::parse(
            "u",
            final_html(&[("3", "Gridiron Gurus", "1st Place"), ("4", "Sackville", "Place")]),
        );
        let rows = extract_playoffs(&page).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].team.team_id(), Some("3".to_string()));
        assert_eq!(rows[0].playoff_rank(), Some("1".to_string()));
        assert_eq!(rows[1].playoff_rank(), None);
    }

    #[test]
    fn test_playoff_rank_variants() {
        let row = |text: &str| PlayoffRow {
            team: TeamRef::new("", "x"),
            place_text: text.to_string(),
        };
        assert_eq!(row("10th Place").playoff_rank(), Some("10".to_string()));
        assert_eq!(row("3rd").playoff_rank(), Some("3".to_string()));
        assert_eq!(row("").playoff_rank(), None);
        assert_eq!(row("Champion 1").playoff_rank(), None);
    }

    #[test]
    fn test_extract_owners_and_count() {
        let page = Page::parse(
            "u",
            owners_html(&[
                ("3", "Gridiron Gurus", "Matt", "24", "2"),
                ("4", "Sackville", "Fancett", "11", "0"),
            ]),
        );
        let rows = extract_owners(&page).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].manager, "Matt");
        assert_eq!(rows[0].moves, "24");
        assert_eq!(rows[1].trades, "0");
        assert_eq!(count_owners(&page).unwrap(), 2);
    }
}
