use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::planner::state::{PlannerRecord, PlannerState};

use super::key_value::KeyValueStore;

/// Key the whole planner is stored under.
pub const PLANNER_KEY: &str = "timeboxProData";

/// What was found under [PLANNER_KEY].
#[derive(Debug)]
pub enum LoadedPlanner {
    /// Nothing was stored yet.
    Missing,
    /// A blob was stored but it isn't a planner.
    Malformed(anyhow::Error),
    Found(PlannerState),
}

/// Load/save boundary between a planner and its [KeyValueStore].
pub struct PersistenceGateway<S> {
    store: S,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Overwrites the stored planner with `state`.
    #[instrument(skip_all, fields(tasks = state.tasks.len()))]
    pub async fn save(&self, state: &PlannerState) -> Result<()> {
        let blob = encode(state)?;
        self.store.set(PLANNER_KEY, &blob).await?;
        debug!("Saved planner for {}", state.date);
        Ok(())
    }

    /// Reads the stored planner. Only a failing store is an error; a missing or unreadable blob is
    /// reported through [LoadedPlanner]. `today` stands in for a stored date that can't be read.
    #[instrument(skip_all)]
    pub async fn load(&self, today: NaiveDate) -> Result<LoadedPlanner> {
        let Some(blob) = self.store.get(PLANNER_KEY).await? else {
            return Ok(LoadedPlanner::Missing);
        };
        Ok(match decode(&blob, today) {
            Ok(state) => LoadedPlanner::Found(state),
            Err(e) => LoadedPlanner::Malformed(e),
        })
    }

    /// Erases the stored planner.
    pub async fn erase(&self) -> Result<()> {
        self.store.remove(PLANNER_KEY).await
    }
}

pub fn encode(state: &PlannerState) -> Result<String> {
    Ok(serde_json::to_string(&PlannerRecord::from(state))?)
}

pub fn decode(blob: &str, today: NaiveDate) -> Result<PlannerState> {
    let record = serde_json::from_str::<PlannerRecord>(blob)
        .context("Stored planner is not a valid planner record")?;
    Ok(record.into_state(today))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;

    use crate::{
        planner::{row::create_task_row, state::PlannerState},
        storage::key_value::memory::MemoryStore,
    };

    use super::{LoadedPlanner, PersistenceGateway, PLANNER_KEY};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
    }

    fn sample_state() -> PlannerState {
        PlannerState {
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            top_priorities: "1. ship release\n2. review".into(),
            brain_dump: "call the dentist".into(),
            tasks: vec![
                create_task_row("09:00 to 09:30", "standup", false),
                create_task_row("09:30 to 11:00", "design doc", true),
                create_task_row("", "", false),
            ],
        }
    }

    #[tokio::test]
    async fn test_save_load_round_trip() -> Result<()> {
        let gateway = PersistenceGateway::new(MemoryStore::default());
        let state = sample_state();

        gateway.save(&state).await?;

        match gateway.load(today()).await? {
            LoadedPlanner::Found(loaded) => assert_eq!(loaded, state),
            other => panic!("Expected a planner, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_load_missing() -> Result<()> {
        let gateway = PersistenceGateway::new(MemoryStore::default());
        assert!(matches!(gateway.load(today()).await?, LoadedPlanner::Missing));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_malformed() -> Result<()> {
        for blob in [
            "{not json",
            "[]",
            r#"{"date":12}"#,
            r#"{"date":"2025-03-15","tasks":null}"#,
        ] {
            let gateway = PersistenceGateway::new(MemoryStore::with_value(PLANNER_KEY, blob));
            assert!(
                matches!(gateway.load(today()).await?, LoadedPlanner::Malformed(_)),
                "{blob} should be malformed"
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_load_full_blob() -> Result<()> {
        let blob = r#"{"date":"2025-03-15","topPriorities":"focus","brainDump":"","tasks":[{"time":"09:00 to 09:30","task":"standup","done":true},{"time":" to ","task":"","done":false}]}"#;
        let gateway = PersistenceGateway::new(MemoryStore::with_value(PLANNER_KEY, blob));

        let LoadedPlanner::Found(state) = gateway.load(today()).await? else {
            panic!("Expected a planner");
        };

        assert_eq!(state.top_priorities, "focus");
        assert_eq!(state.tasks.len(), 2);
        assert!(state.tasks[0].done);
        assert_eq!(state.tasks[1], Default::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_load_cleared_date() -> Result<()> {
        let blob = r#"{"date":"","topPriorities":"ship","brainDump":"notes","tasks":[{"time":"09:00 to 09:30","task":"standup","done":true}]}"#;
        let gateway = PersistenceGateway::new(MemoryStore::with_value(PLANNER_KEY, blob));

        let LoadedPlanner::Found(state) = gateway.load(today()).await? else {
            panic!("Expected a planner");
        };

        assert_eq!(state.date, today());
        assert_eq!(state.top_priorities, "ship");
        assert_eq!(state.brain_dump, "notes");
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].description, "standup");
        assert_eq!(gateway.store().value(PLANNER_KEY).as_deref(), Some(blob));
        Ok(())
    }

    #[tokio::test]
    async fn test_erase() -> Result<()> {
        let gateway = PersistenceGateway::new(MemoryStore::default());
        gateway.save(&sample_state()).await?;

        gateway.erase().await?;

        assert_eq!(gateway.store().value(PLANNER_KEY), None);
        Ok(())
    }
}
