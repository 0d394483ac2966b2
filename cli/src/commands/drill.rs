//! `regdrill drill`: the full interactive drill.

use std::io::{self, Write};

use anyhow::{bail, Result};
use crossbeam_channel::select;
use registration_drill_core::core::time::LEAD_OPTIONS;
use registration_drill_core::orchestrator::setup::COLLEGES;
use registration_drill_core::orchestrator::{DrillError, DrillRuntime, FileSessionStore, Portal};

use crate::commands::browse;
use crate::context::DrillContext;
use crate::input::Input;

enum LoginExit {
    LoggedIn,
    BackToSetup,
    Quit,
}

pub fn run(ctx: &DrillContext) -> Result<()> {
    let runtime = DrillRuntime::system();
    let mut portal = Portal::new(
        ctx.config.clone(),
        ctx.catalog.clone(),
        runtime,
        ctx.session_store(),
    )?;
    let input = Input::spawn();

    loop {
        setup(&mut portal, &input)?;
        match login(&mut portal, &input)? {
            LoginExit::Quit => return Ok(()),
            LoginExit::BackToSetup => continue,
            LoginExit::LoggedIn => {}
        }

        let Some(browser) = portal.open_browser() else {
            bail!("session was not stored");
        };
        let events = browse::repl(browser, &input, portal.store_mut())?;
        println!("로그아웃되었습니다. ({} events)", events.len());

        portal.restart()?;
        let again = input.prompt("다시 하시겠습니까? (y/N) ")?;
        if !again.eq_ignore_ascii_case("y") {
            return Ok(());
        }
    }
}

/// Fill the setup form until it validates and the clock is anchored.
fn setup(portal: &mut Portal<FileSessionStore>, input: &Input) -> Result<()> {
    println!("== 시뮬레이션 환경 설정 ==");
    loop {
        let form = portal.form().clone();
        let boundary = input.prompt_or("수강신청 시작 시각", &form.boundary)?;
        let lead = input.prompt_or(
            &format!("시작 전 대기 시간(초) {LEAD_OPTIONS:?}"),
            &form.lead_seconds.to_string(),
        )?;

        let college = input.choose("대학 선택", &COLLEGES)?;
        let form = portal.form_mut()?;
        form.boundary = boundary;
        form.lead_seconds = lead.parse().unwrap_or(form.lead_seconds);
        if let Some(college) = college {
            form.select_college(college);
        }

        let departments: Vec<String> = portal.department_options().into_iter().map(str::to_string).collect();
        let options: Vec<&str> = departments.iter().map(String::as_str).collect();
        if !options.is_empty() {
            if let Some(department) = input.choose("학과 선택", &options)? {
                portal.form_mut()?.select_department(department);
            }
        }

        let form = portal.form().clone();
        let year = input.prompt_or("학년 (1-4)", &form.year.to_string())?;
        let name = input.prompt_or("이름", &form.name)?;
        let student_id = input.prompt_or("학번", &form.student_id)?;
        let form = portal.form_mut()?;
        form.year = year.parse().unwrap_or(form.year);
        form.name = name;
        form.student_id = student_id;

        match portal.enter_login() {
            Ok(anchor) => {
                tracing::info!(sim_anchor_ms = anchor.sim_anchor_ms, "setup complete");
                return Ok(());
            }
            Err(DrillError::Setup(e)) => println!("소속 정보를 정확히 선택해주세요. ({e})"),
            Err(e) => return Err(e.into()),
        }
    }
}

/// Show the live clock until the user logs in, goes back or quits.
fn login(portal: &mut Portal<FileSessionStore>, input: &Input) -> Result<LoginExit> {
    println!("== 로그인 ==  Enter: 로그인, b: 정보 수정, q: 종료");
    let readings = portal.start_display()?.readings().clone();

    loop {
        select! {
            recv(readings) -> reading => {
                if let Ok(reading) = reading {
                    print!("\r서버 시간 {reading}  ");
                    io::stdout().flush()?;
                }
            }
            recv(input.lines()) -> line => {
                let Ok(line) = line else { bail!("input closed") };
                println!();
                match line.as_str() {
                    "" => break,
                    "b" => {
                        portal.back_to_setup()?;
                        return Ok(LoginExit::BackToSetup);
                    }
                    "q" => return Ok(LoginExit::Quit),
                    _ => println!("Enter: 로그인, b: 정보 수정, q: 종료"),
                }
            }
        }
    }

    let pending = portal.begin_login()?;
    println!("처리중입니다. 잠시만 기다려 주십시오...");
    std::thread::sleep(pending.delay());
    let outcome = portal.complete_login(pending)?;
    input.drain();

    tracing::info!(
        early = outcome.record.is_early(),
        delay_ms = outcome.delay_ms,
        "login complete"
    );
    Ok(LoginExit::LoggedIn)
}
