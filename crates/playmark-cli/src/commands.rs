//! Command execution.
//!
//! Each invocation is a one-shot host around the core: open the durable
//! store, load the record, apply the operation, then advance the
//! deterministic scheduler past every delay so pending timers (the
//! debounced progress write in particular) land before the process exits.

use playmark_core::{
    Config, EngagementController, ItemId, ManualScheduler, SqliteStore, Viewer,
};

use crate::{Commands, Toggle};

type Controller = EngagementController<SqliteStore, ManualScheduler>;

pub fn run(viewer: Option<String>, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let viewer = match viewer {
        Some(id) => Viewer::signed_in(id),
        None => Viewer::Anonymous,
    };
    let tuning = Config::load()?.tuning;
    let store = SqliteStore::open()?;

    let item = match &command {
        Commands::React { item, .. }
        | Commands::Plan { item, .. }
        | Commands::Progress { item, .. }
        | Commands::Play { item }
        | Commands::Show { item } => ItemId::new(item.clone()),
    };

    let mut ctl =
        EngagementController::new(viewer, Some(item), store, ManualScheduler::new())
            .with_tuning(tuning);
    ctl.load();

    match command {
        Commands::React { kind, .. } => ctl.set_reaction(kind.into())?,
        Commands::Plan { state, .. } => ctl.set_planning(matches!(state, Toggle::On))?,
        Commands::Progress { percent, .. } => ctl.set_progress(percent)?,
        Commands::Play { .. } => ctl.start_play()?,
        Commands::Show { .. } => {}
    }

    finish(ctl)
}

/// Flush pending timers, tear down, and print the final snapshot.
fn finish(mut ctl: Controller) -> Result<(), Box<dyn std::error::Error>> {
    let max_delay = ctl.tuning().max_delay_ms();
    ctl.advance_timers(max_delay);
    ctl.dispose();
    println!("{}", serde_json::to_string_pretty(&ctl.snapshot())?);
    Ok(())
}
