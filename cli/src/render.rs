//! Plain-text rendering of browser state.

use anyhow::{bail, Result};
use registration_drill_core::cart::{LiberalClass, ViewMode};
use registration_drill_core::latency::LatencyConfig;
use registration_drill_core::orchestrator::CatalogBrowser;
use registration_drill_core::SessionRecord;

pub fn header(session: &SessionRecord) {
    let id = &session.identity;
    println!("==========================================================");
    println!(
        " {} ({})  {}  {}",
        id.name,
        id.student_id,
        id.department,
        id.year_label()
    );
    println!(" 수강신청 시작: {}", session.boundary_text);
    if session.is_early() {
        println!(" ※ 수강신청 기간이 아닙니다. 신청 버튼이 표시되지 않습니다.");
    }
    println!("==========================================================");
}

pub fn notice(browser: &CatalogBrowser) {
    if !browser.notice_open() {
        return;
    }
    println!("┌ [수강신청 공지사항] ('close'로 닫기)");
    for line in notice_lines(browser.latency_config(), browser.session().is_early()) {
        println!("│ {line}");
    }
    println!("└");
}

fn seconds(ms: u64) -> String {
    if ms % 1000 == 0 {
        format!("{}초", ms / 1000)
    } else {
        format!("{:.1}초", ms as f64 / 1000.0)
    }
}

fn notice_lines(latency: &LatencyConfig, early: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "※ 실제 상황 시뮬레이션: 로그인 지연 최대 {} / 신청 지연 최대 {} 적용 중.",
        seconds(latency.max_login_ms()),
        seconds(latency.max_submit_ms())
    )];
    if early {
        lines.push(
            "※ 시작시간 이전 로그인 감지: 신청 기능이 비활성화되었습니다. 로그아웃 후 다시 로그인하세요."
                .to_string(),
        );
    }
    lines.push("※ 장바구니 과목이 기본으로 표시됩니다.".to_string());
    lines
}

pub fn rows(browser: &CatalogBrowser) {
    let rows = browser.rows();
    let search = if browser.search().is_empty() {
        String::new()
    } else {
        format!(" 검색: '{}'", browser.search())
    };
    println!("■ {} [{}건]{search}", browser.view().label(), rows.len());
    for row in rows {
        let c = row.course;
        let action = match row.register {
            Some(a) if a.enabled => format!("[신청 {}]", c.id),
            Some(_) => "[처리중]".to_string(),
            None => String::new(),
        };
        println!(
            "{:>3} {:<9} {:<4} {:<24} {}학점 {:<8} {:<14} {}",
            row.number,
            c.code,
            c.category.label(),
            c.title,
            c.credits,
            c.instructor,
            c.schedule,
            action
        );
    }
}

pub fn applied(browser: &CatalogBrowser) {
    let applied = browser.applied();
    println!(
        "■ 수강신청내역 [신청: {}건, {}학점]",
        applied.len(),
        applied.total_credits()
    );
    for entry in applied.entries() {
        println!(
            "    {:<9} {:<24} {}학점  {}  [취소 {}]",
            entry.course.code,
            entry.course.title,
            entry.course.credits,
            entry.applied_at(),
            entry.course.id
        );
    }
}

/// Parse `view <mode> [args..]`.
///
/// ```text
/// view cart | mydept | teaching | general
/// view liberal 교필|교선 [area]
/// view dept [college] [department]
/// ```
pub fn parse_view(args: &[&str]) -> Result<ViewMode> {
    let view = match args {
        ["cart"] => ViewMode::Cart,
        ["mydept"] => ViewMode::MyDepartment,
        ["teaching"] => ViewMode::Teaching,
        ["general"] => ViewMode::GeneralElective,
        ["liberal", class, rest @ ..] => {
            let class = match *class {
                "교필" => LiberalClass::Required,
                "교선" => LiberalClass::Elective,
                other => bail!("unknown liberal class '{other}' (교필 or 교선)"),
            };
            ViewMode::liberal(class, rest.first().copied())?
        }
        ["dept"] => ViewMode::by_department(None, None)?,
        ["dept", college] => ViewMode::by_department(Some(*college), None)?,
        ["dept", college, department @ ..] => {
            let department = format!("{college} {}", department.join(" "));
            ViewMode::by_department(Some(*college), Some(department.as_str()))?
        }
        _ => bail!("usage: view cart|mydept|teaching|general|liberal <class> [area]|dept [college] [department]"),
    };
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view() {
        assert_eq!(parse_view(&["cart"]).unwrap(), ViewMode::Cart);
        assert_eq!(
            parse_view(&["liberal", "교선", "균형(인문)"]).unwrap(),
            ViewMode::Liberal {
                class: LiberalClass::Elective,
                area: Some("균형(인문)".to_string())
            }
        );
        assert_eq!(
            parse_view(&["dept", "융합공과대학", "컴퓨터과학전공"]).unwrap(),
            ViewMode::ByDepartment {
                college: Some("융합공과대학".to_string()),
                department: Some("융합공과대학 컴퓨터과학전공".to_string())
            }
        );
        assert!(parse_view(&["liberal", "교필", "균형(인문)"]).is_err());
        assert!(parse_view(&["nope"]).is_err());
    }

    #[test]
    fn test_notice_lines() {
        let latency = LatencyConfig::default();
        let on_time = notice_lines(&latency, false);
        assert_eq!(
            on_time[0],
            "※ 실제 상황 시뮬레이션: 로그인 지연 최대 40초 / 신청 지연 최대 8초 적용 중."
        );
        assert!(!on_time.iter().any(|l| l.contains("이전 로그인 감지")));

        let early = notice_lines(&latency, true);
        assert_eq!(early.len(), on_time.len() + 1);
        assert!(early[1].starts_with("※ 시작시간 이전 로그인 감지"));
        assert_eq!(seconds(1_500), "1.5초");
    }
}
