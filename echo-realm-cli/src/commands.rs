//! Subcommand handlers. Each one performs a single store operation and prints the outcome.
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use colored::Colorize;
use echo_realm_game::{
    AppState, Clock, EntryInput, HistoryFilter, HttpTransport, Quest, QuestStatus, StateStorage,
    StrategyController, Store, summarize_derivation,
};
use std::fs;

use crate::{Command, QuestCommand};

pub async fn run<S, C, T>(
    command: Command,
    store: &mut Store<S, C>,
    controller: &mut StrategyController<T>,
) -> Result<()>
where
    S: StateStorage,
    C: Clock,
    T: HttpTransport + Clone,
{
    match command {
        Command::Entry {
            text,
            date,
            mood,
            energy,
        } => {
            let submitted = store.submit_entry(EntryInput {
                date,
                text: text.clone(),
                mood,
                energy,
            })?;
            let verb = if submitted.replaced_previous {
                "rewritten"
            } else {
                "saved"
            };
            println!(
                "📝 Entry {} {}",
                submitted.entry.date.bright_white().bold(),
                verb
            );
            let now = store.clock().now();
            let summary = controller
                .summarize_entry(now, &text, &submitted.derived)
                .await;
            println!("   {}", summary.cyan());
            if submitted.levels_gained > 0 {
                println!(
                    "🎉 Level up! Now level {}",
                    store.state().stats.level.to_string().bright_green().bold()
                );
            }
        }
        Command::Quest(quest) => run_quest(quest, store, controller).await?,
        Command::Undo => {
            if store.undo_last_entry() {
                println!("↩️  Last entry change reverted");
            } else {
                println!("Nothing to undo");
            }
        }
        Command::Status => print_status(store.state()),
        Command::History { filter, limit } => {
            print_history(store.state(), filter.into(), limit);
        }
        Command::Export { output } => {
            let json = store.export_state()?;
            if let Some(path) = output {
                fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("💾 Exported to {}", path.display());
            } else {
                println!("{json}");
            }
        }
        Command::Import { path } => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            store.import_state(&raw)?;
            println!("📥 Imported {}", path.display());
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("reset deletes all progress; pass --yes to confirm");
            }
            store.reset();
            println!("🧹 Progress reset");
        }
        Command::Rename { name } => {
            if !store.rename_player(&name) {
                bail!("name must not be empty");
            }
            println!("👤 Renamed to {}", name.trim().bright_white().bold());
        }
    }
    Ok(())
}

async fn run_quest<S, C, T>(
    command: QuestCommand,
    store: &mut Store<S, C>,
    controller: &mut StrategyController<T>,
) -> Result<()>
where
    S: StateStorage,
    C: Clock,
    T: HttpTransport + Clone,
{
    match command {
        QuestCommand::List { all } => {
            let quests: Vec<&Quest> = store
                .state()
                .quests
                .iter()
                .filter(|q| all || q.is_open())
                .collect();
            if quests.is_empty() {
                println!("No quests");
            }
            for quest in quests {
                println!("{}", quest_line(quest));
            }
            println!("🎲 Rerolls left today: {}", store.rerolls_left_today());
        }
        QuestCommand::New => {
            let quest = store.generate_quest();
            println!("✨ {}", quest_line(&quest));
        }
        QuestCommand::Suggest => {
            let now = store.clock().now();
            let ideas = controller.suggest_quests(now, store.state()).await;
            let added = store.add_quest_ideas(ideas);
            if added.is_empty() {
                println!("No quest ideas from the {} strategy", controller.mode());
            }
            for quest in &added {
                println!("✨ {}", quest_line(quest));
            }
        }
        QuestCommand::Done { id } => {
            if !store.complete_quest(&id) {
                bail!("quest {id} is not open");
            }
            println!("✅ Quest {} completed", id.green());
        }
        QuestCommand::Skip { id } => {
            if !store.skip_quest(&id) {
                bail!("quest {id} is not open");
            }
            println!("⏭️  Quest {} skipped", id.yellow());
        }
        QuestCommand::Reroll { id } => {
            let quest = store.reroll_quest(&id)?;
            println!("🎲 {}", quest_line(&quest));
            println!("   Rerolls left today: {}", store.rerolls_left_today());
        }
    }
    Ok(())
}

fn quest_line(quest: &Quest) -> String {
    let status = match quest.status {
        QuestStatus::Open => quest.status.as_str().bright_yellow(),
        QuestStatus::Done => quest.status.as_str().green(),
        QuestStatus::Skipped => quest.status.as_str().dimmed(),
    };
    format!(
        "[{status}] {} {} ({})",
        quest.id.dimmed(),
        quest.title.bold(),
        quest.reward.describe()
    )
}

fn print_status(state: &AppState) {
    let stats = &state.stats;
    println!(
        "{} {}",
        "👤".bold(),
        state.profile.name.bright_white().bold()
    );
    println!(
        "   Level {}  XP {}/{} ({}%)",
        stats.level.to_string().bright_green().bold(),
        stats.xp,
        stats.xp_to_next,
        stats.progress_pct()
    );
    let attributes: Vec<String> = stats
        .attributes
        .iter()
        .map(|(name, value)| format!("{name} {value}"))
        .collect();
    println!("   {}", attributes.join("  ").cyan());
    println!(
        "🏕️  {} (tier {}, {} slots)",
        state.base.name.bright_white(),
        state.base.tier,
        state.base.slots
    );
    let open = state.open_quests().count();
    println!("📜 {} entries, {open} open quests", state.entries.len());
    if let Some(latest) = state.entries_by_date_desc().first() {
        let gained = latest
            .derived
            .as_ref()
            .map(summarize_derivation)
            .unwrap_or_default();
        println!("   Latest: {} {}", latest.date, gained.dimmed());
    }
}

fn print_history(state: &AppState, filter: HistoryFilter, limit: usize) {
    let records = state.history.recent(filter, limit);
    if records.is_empty() {
        println!("No history yet");
    }
    for record in records {
        let when = DateTime::<Utc>::from_timestamp_millis(record.ts)
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{} {:16} {}",
            when.dimmed(),
            record.tag().bright_blue(),
            record.summary
        );
    }
}
