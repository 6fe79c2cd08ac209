use std::cell::RefCell;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::config::AppConfig;
use crate::logic::{CommandResult, LogicManager, UiEvent};
use crate::model::sample::sample_people;
use crate::model::{Model, ModelManager, Person, Tag};

#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
    /// Commands to run in order, one per argument (e.g. "find alex")
    #[arg(required = true)]
    pub commands: Vec<String>,
    /// Print each result as a JSON object instead of plain feedback
    #[arg(long)]
    pub json: bool,
    /// Keep running the remaining commands after one fails
    #[arg(long)]
    pub keep_going: bool,
}

/// Starts a session from config, seeding sample people when asked to.
pub fn build_logic(config: &AppConfig) -> Result<LogicManager> {
    let model = if config.seed_sample_data {
        let people = sample_people().context("building sample people")?;
        let model = ModelManager::from_details(people).context("seeding sample people")?;
        tracing::info!(persons = model.address_book().len(), "seeded sample data");
        model
    } else {
        ModelManager::default()
    };
    Ok(LogicManager::new(
        model,
        config.undo_limit,
        config.history_limit,
    ))
}

pub fn run_shell(config: &AppConfig) -> Result<()> {
    let mut logic = build_logic(config)?;
    let interactive = atty::is(atty::Stream::Stdin);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    shell_loop(&mut logic, config, stdin.lock(), &mut out, interactive)
}

/// Reads one command per line until end of input or `exit`.
fn shell_loop<R: BufRead, W: Write>(
    logic: &mut LogicManager,
    config: &AppConfig,
    mut input: R,
    out: &mut W,
    interactive: bool,
) -> Result<()> {
    let pending = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&pending);
    logic.register_observer(move |event: &UiEvent| sink.borrow_mut().push(event.clone()));

    writeln!(out, "Browser display: {}", config.display_type())?;
    if config.shell.show_list_after_command {
        write!(out, "{}", format_person_list(&logic.filtered_person_list()))?;
    }

    let mut line = String::new();
    loop {
        if interactive {
            write!(out, "{}", config.shell.prompt)?;
            out.flush()?;
        }
        line.clear();
        if input.read_line(&mut line).context("reading command")? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match logic.execute(&line) {
            Ok(result) => writeln!(out, "{}", result.feedback)?,
            Err(err) => writeln!(out, "{err}")?,
        }

        let events: Vec<UiEvent> = pending.borrow_mut().drain(..).collect();
        let mut exit = false;
        for event in events {
            match event {
                UiEvent::ExitAppRequest => exit = true,
                other => write!(out, "{}", render_event(logic, config, &other))?,
            }
        }
        out.flush()?;
        if exit {
            break;
        }
    }
    Ok(())
}

fn render_event(logic: &LogicManager, config: &AppConfig, event: &UiEvent) -> String {
    match event {
        UiEvent::AddressBookChanged | UiEvent::PersonListChanged
            if config.shell.show_list_after_command =>
        {
            format_person_list(&logic.filtered_person_list())
        }
        UiEvent::AddressBookChanged | UiEvent::PersonListChanged | UiEvent::ExitAppRequest => {
            String::new()
        }
        UiEvent::JumpToBrowser { display } => format!("Browser display: {display}\n"),
        UiEvent::JumpToListRequest { index } => logic
            .filtered_person_list()
            .get(index.zero_based())
            .map(|person| format!("{}\n", person))
            .unwrap_or_default(),
    }
}

#[derive(Debug, Serialize)]
struct ExecRecord<'a> {
    command: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<CommandResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run_exec(config: &AppConfig, args: ExecArgs) -> Result<()> {
    let mut logic = build_logic(config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let failed = exec_commands(&mut logic, &args, &mut out)?;
    if failed > 0 {
        bail!("{failed} command(s) failed");
    }
    Ok(())
}

/// Returns how many commands failed.
fn exec_commands<W: Write>(
    logic: &mut LogicManager,
    args: &ExecArgs,
    out: &mut W,
) -> Result<usize> {
    let mut failed = 0;
    for command in &args.commands {
        let outcome = logic.execute(command);
        let ok = outcome.is_ok();
        let exit = matches!(
            &outcome,
            Ok(CommandResult {
                event: Some(UiEvent::ExitAppRequest),
                ..
            })
        );
        if args.json {
            let record = match outcome {
                Ok(result) => ExecRecord {
                    command,
                    ok,
                    result: Some(result),
                    error: None,
                },
                Err(err) => ExecRecord {
                    command,
                    ok,
                    result: None,
                    error: Some(err.to_string()),
                },
            };
            let json = serde_json::to_string(&record).context("serializing command result")?;
            writeln!(out, "{json}")?;
        } else {
            match outcome {
                Ok(result) => writeln!(out, "{}", result.feedback)?,
                Err(err) => writeln!(out, "{err}")?,
            }
        }

        if !ok {
            failed += 1;
            tracing::warn!(%command, "command failed");
            if !args.keep_going {
                break;
            }
        }
        if exit {
            break;
        }
    }
    Ok(failed)
}

/// One person per line, columns padded by display width.
pub fn format_person_list(persons: &[&Person]) -> String {
    if persons.is_empty() {
        return "(no persons listed)\n".to_owned();
    }
    let number_width = persons.len().to_string().len();
    let name_width = persons
        .iter()
        .map(|p| p.name().as_str().width())
        .max()
        .unwrap_or(0);
    let phone_width = persons
        .iter()
        .map(|p| p.phone().as_str().width())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (i, person) in persons.iter().enumerate() {
        let mut line = format!(
            "{:>number_width$}. {}  {}  {}",
            i + 1,
            pad(person.name().as_str(), name_width),
            pad(person.phone().as_str(), phone_width),
            person.email()
        );
        let tags: String = person.tags().iter().map(Tag::to_string).collect();
        if !tags.is_empty() {
            line.push_str("  ");
            line.push_str(&tags);
        }
        let _ = writeln!(&mut out, "{line}");
    }
    out
}

fn pad(text: &str, width: usize) -> String {
    let mut padded = text.to_owned();
    padded.extend(std::iter::repeat(' ').take(width.saturating_sub(text.width())));
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::person::tests::details;
    use crate::model::Name;
    use std::io::Cursor;

    type TestResult<T = ()> = Result<T>;

    fn quiet_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.shell.show_list_after_command = false;
        config
    }

    #[test]
    fn person_list_aligns_columns() -> TestResult {
        let model = ModelManager::from_details([
            details("Alice Pauline", "94351253", &["friends"]),
            details("Bo", "123", &[]),
        ])?;
        let rendered = format_person_list(&model.filtered_person_list());
        insta::assert_snapshot!(rendered.trim_end(), @r"
        1. Alice Pauline  94351253  alicepauline@example.com  [friends]
        2. Bo             123       bo@example.com
        ");
        Ok(())
    }

    #[test]
    fn wide_names_pad_by_display_width() -> TestResult {
        let mut wide = details("Li Xiaolong", "111", &[]);
        wide.name = Name::parse("李小龙")?;
        let model = ModelManager::from_details([wide, details("Bob Lim", "222", &[])])?;
        let rendered = format_person_list(&model.filtered_person_list());
        let phone_columns: Vec<usize> = rendered
            .lines()
            .zip(["111", "222"])
            .map(|(line, phone)| {
                let start = line.find(phone).unwrap_or(line.len());
                line[..start].width()
            })
            .collect();
        assert_eq!(phone_columns, [12, 12]);
        Ok(())
    }

    #[test]
    fn empty_list_says_so() {
        assert_eq!(format_person_list(&[]), "(no persons listed)\n");
    }

    #[test]
    fn shell_stops_at_exit() -> TestResult {
        let config = quiet_config();
        let mut logic = build_logic(&config)?;
        let input = Cursor::new("list\n\nchoose facebook\nexit\nclear\n");
        let mut out = Vec::new();
        shell_loop(&mut logic, &config, input, &mut out, false)?;

        let text = String::from_utf8(out)?;
        assert!(text.starts_with("Browser display: linkedin\n"));
        assert!(text.contains("Listed all persons\n"));
        assert!(text.contains("Selected type facebook\nBrowser display: facebook\n"));
        assert!(text.ends_with("Exiting Address Book as requested ...\n"));
        assert_eq!(logic.history().entries(), ["list", "choose facebook", "exit"]);
        assert!(!logic.model().address_book().is_empty());
        Ok(())
    }

    #[test]
    fn shell_lists_matches_after_find() -> TestResult {
        let config = AppConfig::default();
        let mut logic = build_logic(&config)?;
        let mut out = Vec::new();
        shell_loop(&mut logic, &config, Cursor::new("find bernice
"), &mut out, false)?;
        let text = String::from_utf8(out)?;
        let (_, after_find) = text
            .split_once("1 persons listed!\n")
            .context("find feedback missing")?;
        assert!(after_find.starts_with("1. Bernice Yu"), "{after_find:?}");
        assert!(!after_find.contains("Alex Yeoh"));
        Ok(())
    }

    #[test]
    fn quiet_shell_skips_list_after_sort() -> TestResult {
        let config = quiet_config();
        let mut logic = build_logic(&config)?;
        let mut out = Vec::new();
        shell_loop(&mut logic, &config, Cursor::new("sort
"), &mut out, false)?;
        assert_eq!(
            String::from_utf8(out)?,
            "Browser display: linkedin\nSorted all persons by name\n"
        );
        Ok(())
    }

    #[test]
    fn shell_prints_errors_and_continues() -> TestResult {
        let config = quiet_config();
        let mut logic = build_logic(&config)?;
        let mut out = Vec::new();
        shell_loop(&mut logic, &config, Cursor::new("undo\nbogus\nlist\n"), &mut out, false)?;
        let text = String::from_utf8(out)?;
        assert!(text.contains("No more commands to undo!\nUnknown command\nListed all persons\n"));
        Ok(())
    }

    #[test]
    fn exec_stops_at_first_failure_unless_keep_going() -> TestResult {
        let config = quiet_config();
        let commands = vec!["delete 99".to_owned(), "clear".to_owned()];

        let mut logic = build_logic(&config)?;
        let args = ExecArgs {
            commands: commands.clone(),
            json: false,
            keep_going: false,
        };
        let mut out = Vec::new();
        assert_eq!(exec_commands(&mut logic, &args, &mut out)?, 1);
        assert!(!logic.model().address_book().is_empty());

        let mut logic = build_logic(&config)?;
        let args = ExecArgs {
            commands,
            json: false,
            keep_going: true,
        };
        let mut out = Vec::new();
        assert_eq!(exec_commands(&mut logic, &args, &mut out)?, 1);
        assert!(logic.model().address_book().is_empty());
        assert_eq!(
            String::from_utf8(out)?,
            "The person index provided is invalid\nAddress book has been cleared!\n"
        );
        Ok(())
    }

    #[test]
    fn exec_stops_at_exit() -> TestResult {
        let config = quiet_config();
        let mut logic = build_logic(&config)?;
        let args = ExecArgs {
            commands: vec!["exit".into(), "clear".into()],
            json: false,
            keep_going: true,
        };
        let mut out = Vec::new();
        assert_eq!(exec_commands(&mut logic, &args, &mut out)?, 0);
        assert_eq!(String::from_utf8(out)?, "Exiting Address Book as requested ...\n");
        assert!(!logic.model().address_book().is_empty());
        assert_eq!(logic.history().entries(), ["exit"]);
        Ok(())
    }

    #[test]
    fn exec_json_records() -> TestResult {
        let mut config = quiet_config();
        config.seed_sample_data = false;
        let mut logic = build_logic(&config)?;
        let args = ExecArgs {
            commands: vec!["choose meeting".into(), "undo".into()],
            json: true,
            keep_going: true,
        };
        let mut out = Vec::new();
        exec_commands(&mut logic, &args, &mut out)?;
        let text = String::from_utf8(out)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            r#"{"command":"choose meeting","ok":true,"result":{"feedback":"Selected type meeting","event":{"event":"jump_to_browser","display":"meeting"}}}"#
        );
        assert_eq!(
            lines[1],
            r#"{"command":"undo","ok":false,"error":"No more commands to undo!"}"#
        );
        Ok(())
    }
}
