//! Browse phase REPL, shared by `drill` and `browse`.

use std::io::{self, Write};

use anyhow::{Context, Result};
use registration_drill_core::cart::CancelOutcome;
use registration_drill_core::models::EventLog;
use registration_drill_core::orchestrator::{
    BrowserAction, BrowserOutcome, CatalogBrowser, DrillError, DrillRuntime, SessionStore,
};

use crate::context::DrillContext;
use crate::input::Input;
use crate::render;

const HELP: &str = "commands: list | view <mode> | search [term] | apply <id> | cancel <id> | applied | close | logout";

/// `regdrill browse`: reopen the stored session.
pub fn run(ctx: &DrillContext) -> Result<()> {
    let mut store = ctx.session_store();
    let Some(browser) = CatalogBrowser::open(
        &store,
        ctx.catalog.clone(),
        &ctx.config,
        DrillRuntime::system(),
    ) else {
        // Fail closed: nothing to show without a session.
        tracing::warn!(dir = %ctx.session_dir.display(), "no stored session");
        return Ok(());
    };
    let input = Input::spawn();
    let events = repl(browser, &input, &mut store)?;
    println!("로그아웃되었습니다. ({} events)", events.len());
    Ok(())
}

/// Run `action` through the gate, showing the processing overlay.
///
/// The outer error is terminal I/O; the inner one is the drill's answer.
fn perform(
    browser: &mut CatalogBrowser,
    input: &Input,
    action: BrowserAction,
) -> Result<Result<BrowserOutcome, DrillError>> {
    let pending = match browser.begin(action) {
        Ok(pending) => pending,
        Err(e) => return Ok(Err(e)),
    };
    print!("처리중입니다... ");
    io::stdout().flush().context("flush processing overlay")?;
    std::thread::sleep(pending.delay());
    let outcome = browser.complete(pending);
    let ignored = input.drain();
    if ignored > 0 {
        tracing::debug!(ignored, "input discarded while processing");
    }
    println!();
    Ok(outcome)
}

/// Read commands until logout; returns the browser's event log.
pub fn repl(mut browser: CatalogBrowser, input: &Input, store: &mut dyn SessionStore) -> Result<EventLog> {
    render::header(browser.session());
    render::notice(&browser);
    render::rows(&browser);
    println!("{HELP}");

    loop {
        let line = input.prompt("sugang> ")?;
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["list"] => render::rows(&browser),
            ["applied"] => render::applied(&browser),
            ["close"] => browser.close_notice(),
            ["search"] => {
                browser.set_search("");
                render::rows(&browser);
            }
            ["search", term @ ..] => {
                browser.set_search(term.join(" "));
                render::rows(&browser);
            }
            ["view", args @ ..] => match render::parse_view(args) {
                Ok(view) => match perform(&mut browser, input, BrowserAction::ChangeView(view))? {
                    Ok(_) => render::rows(&browser),
                    Err(e) => println!("{e}"),
                },
                Err(e) => println!("{e}"),
            },
            ["apply", id] => match id.parse() {
                Ok(id) => match perform(&mut browser, input, BrowserAction::Register(id))? {
                    Ok(BrowserOutcome::Registered(applied)) => {
                        println!("[{}] 신청되었습니다.", applied.course.title);
                        render::applied(&browser);
                    }
                    Ok(_) => {}
                    Err(e) => println!("{e}"),
                },
                Err(_) => println!("course id must be a number"),
            },
            ["cancel", id] => match id.parse() {
                Ok(id) => {
                    let answer = input.prompt("정말로 수강신청을 취소하시겠습니까? (y/N) ")?;
                    let outcome = if answer.eq_ignore_ascii_case("y") {
                        perform(&mut browser, input, BrowserAction::Cancel(id))?.map(|o| match o {
                            BrowserOutcome::Cancelled(applied) => CancelOutcome::Cancelled(applied),
                            _ => CancelOutcome::NotConfirmed,
                        })
                    } else {
                        browser.cancel(id, false)
                    };
                    match outcome {
                        Ok(CancelOutcome::Cancelled(applied)) => {
                            println!("[{}] 취소되었습니다.", applied.course.title);
                            render::applied(&browser);
                        }
                        Ok(CancelOutcome::NotConfirmed) => {}
                        Err(e) => println!("{e}"),
                    }
                }
                Err(_) => println!("course id must be a number"),
            },
            ["logout"] => {
                return browser.logout(store).context("logout failed");
            }
            _ => println!("{HELP}"),
        }
    }
}
