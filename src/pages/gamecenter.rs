// 🏈 Game Center Extractor - one team's box score for one week
//
// The page shows two sides: teamWrap-1 is the team the page belongs to,
// teamWrap-2 is its opponent. Anything missing comes back as "-" so the
// roster builder can keep rows rectangular.

use super::{all_within, element_text, element_text_tight, first_within, Page};
use crate::error::Result;
use crate::roster::{TeamWeek, SENTINEL};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

pub const GAMECENTER_MARKERS: &[&str] = &["teamMatchupBoxScore"];
pub const SEASON_LENGTH_MARKERS: &[&str] = &["teamMatchupBoxScore", "ww ww-"];

static RANK_IN_PARENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d+)\)").expect("invalid regex: rank"));
static UNSIGNED_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\d.]+").expect("invalid regex: points"));

fn sentinel() -> String {
    SENTINEL.to_string()
}

fn or_sentinel(text: String) -> String {
    if text.is_empty() {
        sentinel()
    } else {
        text
    }
}

fn team_wrap<'a>(page: &'a Page, side: u8) -> Result<Option<ElementRef<'a>>> {
    page.select_first(&format!(
        "div#teamMatchupBoxScore div.teamWrap.teamWrap-{}",
        side
    ))
}

// ============================================================================
// FIELD EXTRACTORS
// ============================================================================

pub fn parse_owner(page: &Page) -> Result<String> {
    Ok(page
        .select_first("span.userName[class*='userId']")?
        .map(|span| or_sentinel(element_text_tight(&span)))
        .unwrap_or_else(sentinel))
}

/// "Gridiron Gurus (3)" → "3"
pub fn parse_rank(page: &Page) -> Result<String> {
    let text = page
        .select_first("span.teamRank[class*='teamId-']")?
        .map(|span| element_text_tight(&span))
        .unwrap_or_default();
    Ok(RANK_IN_PARENS
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(sentinel))
}

pub fn parse_team_name(page: &Page) -> Result<String> {
    let Some(wrap) = team_wrap(page, 1)? else {
        return Ok(sentinel());
    };
    Ok(first_within(&wrap, "h4")?
        .map(|h4| or_sentinel(element_text(&h4)))
        .unwrap_or_else(sentinel))
}

fn team_totals(page: &Page) -> Result<Vec<String>> {
    Ok(page
        .select_all("div.teamTotal[class*='teamId-']")?
        .iter()
        .map(element_text_tight)
        .collect())
}

pub fn parse_team_total(page: &Page) -> Result<String> {
    Ok(team_totals(page)?.into_iter().next().unwrap_or_else(sentinel))
}

pub fn parse_opponent_total(page: &Page) -> Result<String> {
    Ok(team_totals(page)?.into_iter().nth(1).unwrap_or_else(sentinel))
}

/// "Proj 111.65" → "111.65"
pub fn parse_projected_total(page: &Page) -> Result<String> {
    let Some(matchup) = page.select_first("div#teamMatchupBoxScore")? else {
        return Ok(sentinel());
    };
    let scope = team_wrap(page, 1)?.unwrap_or(matchup);
    let Some(projected) = first_within(&scope, ".teamTotalProjected")? else {
        return Ok(sentinel());
    };
    let text = element_text(&projected);
    Ok(UNSIGNED_DECIMAL
        .find(&text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(sentinel))
}

/// Opponent heading, falling back to a user name element
pub fn parse_opponent(page: &Page) -> Result<String> {
    let Some(wrap) = team_wrap(page, 2)? else {
        return Ok(sentinel());
    };
    if let Some(h4) = first_within(&wrap, "h4")? {
        return Ok(or_sentinel(element_text(&h4)));
    }
    if let Some(user) = first_within(&wrap, ".userName")? {
        return Ok(or_sentinel(element_text(&user)));
    }
    Ok(sentinel())
}

fn player_names(page: &Page, wrap_id: &str) -> Result<Vec<String>> {
    let Some(wrap) = page.select_first(&format!("div#{}", wrap_id))? else {
        return Ok(Vec::new());
    };
    Ok(all_within(&wrap, "td.playerNameAndInfo")?
        .iter()
        .map(element_text)
        .collect())
}

pub fn parse_starter_names(page: &Page) -> Result<Vec<String>> {
    player_names(page, "tableWrap-1")
}

pub fn parse_bench_names(page: &Page) -> Result<Vec<String>> {
    player_names(page, "tableWrapBN-1")
}

pub fn parse_bench_len(page: &Page) -> Result<usize> {
    Ok(parse_bench_names(page)?.len())
}

/// Every point cell on the team's side, starters then bench
pub fn parse_points(page: &Page) -> Result<Vec<String>> {
    let Some(wrap) = team_wrap(page, 1)? else {
        return Ok(Vec::new());
    };
    Ok(all_within(&wrap, "td.statTotal")?
        .iter()
        .map(element_text_tight)
        .collect())
}

/// Non-bench slot labels (QB/RB/WR/...) in page order
pub fn parse_starter_slots(page: &Page) -> Result<Vec<String>> {
    let Some(wrap) = team_wrap(page, 1)? else {
        return Ok(Vec::new());
    };
    let mut slots = Vec::new();
    for tr in all_within(&wrap, "tr[class*='player-']")? {
        let slot = first_within(&tr, "span")?
            .map(|span| element_text_tight(&span))
            .unwrap_or_default();
        if slot.is_empty() || slot == "BN" {
            continue;
        }
        slots.push(slot);
    }
    Ok(slots)
}

/// Number of weeks, from the week selector
pub fn parse_season_length(page: &Page) -> Result<u16> {
    Ok(page.select_all("li.ww[class*='ww-']")?.len() as u16)
}

pub fn extract_team_week(page: &Page) -> Result<TeamWeek> {
    Ok(TeamWeek {
        owner: parse_owner(page)?,
        rank: parse_rank(page)?,
        team_name: parse_team_name(page)?,
        starter_slots: parse_starter_slots(page)?,
        starter_names: parse_starter_names(page)?,
        bench_names: parse_bench_names(page)?,
        points: parse_points(page)?,
        total: parse_team_total(page)?,
        projected_total: parse_projected_total(page)?,
        opponent: parse_opponent(page)?,
        opponent_total: parse_opponent_total(page)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod tests {
    use super::fixtures::gamecenter_html;
    use super::*;

    fn sample_page() -> Page {
        Page::parse(
            "u",
            gamecenter_html(
                "Dana",
                3,
                &[("QB", "Josh Allen QB - BUF", "24.30"), ("RB", "Derrick Henry RB - BAL", "11.00")],
                &[("Bench  Guy\n WR - NYJ", "7.20"), ("Other Guy", "0.00")],
                "117.40",
                Some(("Sackville", "98.10")),
            ),
        )
    }

    #[test]
    fn test_extract_team_week() {
        let week = extract_team_week(&sample_page()).unwrap();

        assert_eq!(week.owner, "Dana");
        assert_eq!(week.rank, "3");
        assert_eq!(week.team_name, "Dana Squad");
        assert_eq!(week.starter_slots, vec!["QB", "RB"]);
        assert_eq!(week.starter_names.len(), 2);
        assert_eq!(week.bench_names, vec!["Bench Guy WR - NYJ", "Other Guy"]);
        assert_eq!(week.points, vec!["24.30", "11.00", "7.20", "0.00"]);
        assert_eq!(week.total, "117.40");
        assert_eq!(week.projected_total, "101.25");
        assert_eq!(week.opponent, "Sackville");
        assert_eq!(week.opponent_total, "98.10");
    }

    #[test]
    fn test_bye_page_has_sentinels() {
        let page = Page::parse(
            "u",
            gamecenter_html("Dana", 3, &[("QB", "Josh Allen", "24.30")], &[], "24.30", None),
        );
        let week = extract_team_week(&page).unwrap();

        assert_eq!(week.opponent, "-");
        assert_eq!(week.opponent_total, "-");
        assert_eq!(parse_bench_len(&page).unwrap(), 0);
    }

    #[test]
    fn test_missing_matchup_block() {
        let page = Page::parse("u", "<html><body><p>nothing here</p></body></html>");
        let week = extract_team_week(&page).unwrap();

        assert_eq!(week.owner, "-");
        assert_eq!(week.rank, "-");
        assert!(week.starter_slots.is_empty());
        assert!(week.points.is_empty());
        assert_eq!(week.projected_total, "-");
    }

    #[test]
    fn test_season_length() {
        assert_eq!(parse_season_length(&sample_page()).unwrap(), 3);
    }
}
