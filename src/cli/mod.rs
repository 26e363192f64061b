//! Thin command-line caller over [`LedgerManager`].
//!
//! `hembudget --user <name> <command> [args..]`; see [`USAGE`].

pub mod output;

use std::io::Write;

use chrono::NaiveDate;
use hembudget_config::Config;
use hembudget_core::{NotesService, SummaryService};
use hembudget_domain::{amount, LineAmounts, Month};

use crate::{
    errors::{BudgetError, CliError},
    manager::LedgerManager,
    session::Session,
    utils,
};

pub const USAGE: &str = "\
hembudget --user <name> <command>

commands:
  show <month>                                   show a month (creates it from the template)
  set <month> <category> <item> <budget> <actual> [due-date]
  delete <month> <category> <item>
  rename <month> <old-category> <new-category>
  notes <month> <text..>
  totals <month>
  year
  rows                                           tab-separated export
  backup [note]
  backups
  restore <backup-id>
  users                                          list stored ledgers (no --user needed)";

/// Entry point used by the binary: reads the process arguments and config.
pub fn run_cli() -> Result<(), CliError> {
    let config = utils::load_config()?;
    crate::init_with_filter(config.log_filter.as_deref());
    let args: Vec<String> = std::env::args().skip(1).collect();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&config, &args, &mut out)
}

/// Runs one command against the store described by `config`.
pub fn run(config: &Config, args: &[String], out: &mut dyn Write) -> Result<(), CliError> {
    let invocation = Invocation::parse(args)?;
    let Some((command, rest)) = invocation.command.split_first() else {
        return Err(CliError::Usage(USAGE.to_string()));
    };

    match command.as_str() {
        "help" | "--help" | "-h" => emit(out, USAGE),
        "users" => {
            let storage = utils::json_storage(config)?;
            let catalog = storage.list_ledger_metadata().map_err(BudgetError::from)?;
            for skipped in &catalog.skipped {
                tracing::warn!("ledger file skipped: {skipped}");
                emit(out, format!("warning: skipped {skipped}\n"))?;
            }
            emit(out, output::users(&catalog.entries))
        }
        _ => {
            let session = invocation.session()?;
            let mut manager = LedgerManager::from_config(config)?;
            dispatch(&mut manager, &session, command, rest, out)
        }
    }
}

fn dispatch(
    manager: &mut LedgerManager,
    session: &Session,
    command: &str,
    args: &[String],
    out: &mut dyn Write,
) -> Result<(), CliError> {
    manager.load_ledger(session)?;
    for warning in manager.load_warnings(session) {
        emit(out, format!("warning: {warning}\n"))?;
    }

    match command {
        "show" => {
            let [month] = expect_args::<1>(command, args)?;
            let month = parse_month(month)?;
            let record = manager.select_month(session, month)?.clone();
            let ledger = manager.load_ledger(session)?;
            emit(out, output::month_view(ledger, month, &record))
        }
        "set" => {
            if !(5..=6).contains(&args.len()) {
                return Err(CliError::Usage(
                    "set <month> <category> <item> <budget> <actual> [due-date]".into(),
                ));
            }
            let month = parse_month(&args[0])?;
            let mut amounts =
                LineAmounts::new(parse_amount(&args[3])?, parse_amount(&args[4])?);
            if let Some(raw) = args.get(5) {
                amounts = amounts.with_due_date(parse_date(raw)?);
            }
            manager.upsert_line_item(session, month, &args[1], &args[2], amounts)?;
            let status = SummaryService::row_status(&args[1], amounts.budget, amounts.actual);
            emit(
                out,
                format!(
                    "{month} / {} / {}: {} / {} [{}]\n",
                    args[1].trim(),
                    args[2].trim(),
                    output::amount(amounts.budget),
                    output::amount(amounts.actual),
                    output::status(status)
                ),
            )
        }
        "delete" => {
            let [month, category, item] = expect_args::<3>(command, args)?;
            let removed = manager.delete_line_item(session, parse_month(month)?, category, item)?;
            if removed {
                emit(out, format!("Deleted {category} / {item}\n"))
            } else {
                emit(out, format!("Nothing to delete for {category} / {item}\n"))
            }
        }
        "rename" => {
            let [month, old, new] = expect_args::<3>(command, args)?;
            manager.rename_category(session, parse_month(month)?, old, new)?;
            emit(out, format!("Renamed {} to {}\n", old.trim(), new.trim()))
        }
        "notes" => {
            let Some((month, text)) = args.split_first() else {
                return Err(CliError::Usage("notes <month> <text..>".into()));
            };
            let month = parse_month(month)?;
            manager.set_notes(session, month, &text.join(" "))?;
            let ledger = manager.load_ledger(session)?;
            emit(out, format!("Notes for {month}: {}\n", NotesService::get(ledger, month)))
        }
        "totals" => {
            let [month] = expect_args::<1>(command, args)?;
            let month = parse_month(month)?;
            let ledger = manager.load_ledger(session)?;
            emit(out, output::totals(month, &SummaryService::month_totals(ledger, month)))
        }
        "year" => {
            let ledger = manager.load_ledger(session)?;
            emit(out, output::year(&SummaryService::year_totals(ledger)))
        }
        "rows" => {
            let ledger = manager.load_ledger(session)?;
            emit(out, output::rows(ledger))
        }
        "backup" => {
            let note = (!args.is_empty()).then(|| args.join(" "));
            let info = manager.backup(session, note.as_deref())?;
            emit(out, format!("Backup created: {}\n", info.id))
        }
        "backups" => {
            let backups = manager.list_backups(session)?;
            if backups.is_empty() {
                return emit(out, "No backups.\n");
            }
            for backup in backups {
                emit(out, format!("{}  {}\n", backup.id, backup.created_at))?;
            }
            Ok(())
        }
        "restore" => {
            let [id] = expect_args::<1>(command, args)?;
            manager.restore_backup(session, id)?;
            emit(out, format!("Restored {id}\n"))
        }
        other => Err(CliError::Usage(format!("unknown command `{other}`\n\n{USAGE}"))),
    }
}

struct Invocation {
    user: Option<String>,
    command: Vec<String>,
}

impl Invocation {
    fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut user = None;
        let mut command = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--user" || arg == "-u" {
                let value = iter
                    .next()
                    .ok_or_else(|| CliError::Usage("--user needs a name".into()))?;
                user = Some(value.clone());
            } else if let Some(value) = arg.strip_prefix("--user=") {
                user = Some(value.to_string());
            } else {
                command.push(arg.clone());
            }
        }
        Ok(Self { user, command })
    }

    fn session(&self) -> Result<Session, CliError> {
        let user = self
            .user
            .as_deref()
            .ok_or_else(|| CliError::Usage("--user <name> is required".into()))?;
        Ok(Session::new(user)?)
    }
}

fn expect_args<'a, const N: usize>(
    command: &str,
    args: &'a [String],
) -> Result<[&'a str; N], CliError> {
    if args.len() != N {
        return Err(CliError::Usage(format!(
            "`{command}` takes {N} argument(s), got {}",
            args.len()
        )));
    }
    Ok(std::array::from_fn(|index| args[index].as_str()))
}

fn parse_month(raw: &str) -> Result<Month, CliError> {
    raw.parse()
        .map_err(|err: hembudget_domain::MonthParseError| CliError::Input(err.to_string()))
}

/// Accepts `12.5` and `12,5`. Sign checks are left to the ledger.
fn parse_amount(raw: &str) -> Result<f64, CliError> {
    amount::parse_text(raw).ok_or_else(|| CliError::Input(format!("`{raw}` is not an amount")))
}

fn parse_date(raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::Input(format!("`{raw}` is not a date (YYYY-MM-DD)")))
}

fn emit(out: &mut dyn Write, text: impl AsRef<str>) -> Result<(), CliError> {
    out.write_all(text.as_ref().as_bytes())
        .map_err(|err| CliError::Core(BudgetError::from(err)))
}
