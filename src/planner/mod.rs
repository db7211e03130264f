//! The planner itself. [PlannerController] owns the single [PlannerState] of a session, keeps the
//! derived progress and completed list in sync with it and saves it after every change.

pub mod event;
pub mod progress;
pub mod row;
pub mod state;
pub mod summary;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use event::{PlannerEvent, TaskEdit};
use progress::Progress;
use row::empty_task_row;
use state::{PlannerState, TaskEntry};
use tracing::{debug, info, instrument, warn};

use crate::{
    platform::Platform,
    render::{render_planner, RenderStyle},
    storage::{
        gateway::{LoadedPlanner, PersistenceGateway},
        key_value::KeyValueStore,
    },
    utils::clock::Clock,
};

pub const RESET_CONFIRMATION: &str =
    "Are you sure you want to reset the planner? This will clear all data.";

pub struct PlannerController<S> {
    state: PlannerState,
    progress: Progress,
    completed: Vec<String>,
    gateway: PersistenceGateway<S>,
    clock: Box<dyn Clock>,
    unsaved: bool,
    /// Set when storage couldn't be read. Saving is held back so the stored planner survives.
    load_failed: bool,
}

impl<S: KeyValueStore> PlannerController<S> {
    /// Restores the planner from storage. Loading never fails: a missing, malformed or unreadable
    /// blob all end in a default planner.
    pub async fn load(gateway: PersistenceGateway<S>, clock: Box<dyn Clock>) -> Self {
        let state = PlannerState::new_default(clock.today());
        let mut controller = Self {
            progress: Progress::of(&state.tasks),
            completed: vec![],
            state,
            gateway,
            clock,
            unsaved: false,
            load_failed: false,
        };

        let today = controller.clock.today();
        match controller.gateway.load(today).await {
            Ok(LoadedPlanner::Found(state)) => {
                debug!(
                    "Restored planner for {} with {} tasks",
                    state.date,
                    state.tasks.len()
                );
                controller.state = state;
                controller.refresh_progress();
                controller.refresh_completed();
            }
            Ok(LoadedPlanner::Missing) => {
                info!("No saved planner, starting a new one");
                controller.reset_to_default().await;
            }
            Ok(LoadedPlanner::Malformed(e)) => {
                warn!("Saved planner is corrupted, starting a new one: {e:?}");
                controller.reset_to_default().await;
            }
            Err(e) => {
                warn!("Storage is unavailable, starting a new planner that won't be saved: {e:?}");
                controller.load_failed = true;
            }
        }
        controller
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    /// Whether the latest change could not be written to storage.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Whether storage couldn't be read on load. Until a confirmed reset nothing is written.
    pub fn is_load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn render(&self, style: RenderStyle) -> String {
        render_planner(&self.state, &self.progress, &self.completed, style)
    }

    /// Routes an event to the matching operation.
    #[instrument(skip(self, platform))]
    pub async fn handle(
        &mut self,
        event: PlannerEvent,
        platform: &mut impl Platform,
    ) -> Result<()> {
        match event {
            PlannerEvent::AddTask => self.add_task().await,
            PlannerEvent::RemoveTask(index) => self.remove_task(index).await?,
            PlannerEvent::EditTask { index, edit } => self.edit_task(index, edit).await?,
            PlannerEvent::Print => self.print(platform).await?,
            PlannerEvent::Reset => {
                self.reset(platform).await?;
            }
            PlannerEvent::SetDate(date) => self.set_date(date).await,
            PlannerEvent::SetTopPriorities(text) => self.set_top_priorities(text).await,
            PlannerEvent::SetBrainDump(text) => self.set_brain_dump(text).await,
            PlannerEvent::Unload => self.unload().await,
        }
        Ok(())
    }

    /// Appends an empty row. An empty row can't be completed, so the completed list stays as is.
    pub async fn add_task(&mut self) {
        self.state.tasks.push(empty_task_row());
        self.refresh_progress();
        self.persist().await;
    }

    pub async fn remove_task(&mut self, index: usize) -> Result<()> {
        self.row(index)?;
        let removed = self.state.tasks.remove(index);
        debug!("Removed task {removed:?}");
        self.refresh_progress();
        self.refresh_completed();
        self.persist().await;
        Ok(())
    }

    pub async fn edit_task(&mut self, index: usize, edit: TaskEdit) -> Result<()> {
        let row = self.row(index)?;
        match edit {
            TaskEdit::StartTime(time) => row.start_time = time,
            TaskEdit::EndTime(time) => row.end_time = time,
            TaskEdit::Description(description) => row.description = description,
            TaskEdit::Done(done) => row.done = done,
        }
        self.refresh_progress();
        self.refresh_completed();
        self.persist().await;
        Ok(())
    }

    pub async fn set_date(&mut self, date: NaiveDate) {
        self.state.date = date;
        self.persist().await;
    }

    pub async fn set_top_priorities(&mut self, text: String) {
        self.state.top_priorities = text;
        self.persist().await;
    }

    pub async fn set_brain_dump(&mut self, text: String) {
        self.state.brain_dump = text;
        self.persist().await;
    }

    /// Sends the printable sheet to the platform. Nothing in the planner changes.
    pub async fn print(&self, platform: &mut impl Platform) -> Result<()> {
        platform.print(&self.render(RenderStyle::Plain)).await
    }

    /// Asks for confirmation and, when given, wipes the planner. Returns whether the reset
    /// happened.
    pub async fn reset(&mut self, platform: &mut impl Platform) -> Result<bool> {
        if !platform.confirm(RESET_CONFIRMATION).await? {
            debug!("Reset declined");
            return Ok(false);
        }
        self.reset_to_default().await;
        info!("Planner reset");
        Ok(true)
    }

    /// Last save before the session goes away. Failures are only logged.
    pub async fn unload(&mut self) {
        self.persist().await;
    }

    /// Today's date, empty texts, three empty rows, and nothing in storage.
    async fn reset_to_default(&mut self) {
        self.state = PlannerState::new_default(self.clock.today());
        self.refresh_progress();
        self.refresh_completed();

        match self.gateway.erase().await {
            Ok(()) => {
                self.unsaved = false;
                self.load_failed = false;
            }
            Err(e) => {
                warn!("Failed to erase saved planner {e:?}");
                self.unsaved = true;
            }
        }
    }

    fn row(&mut self, index: usize) -> Result<&mut TaskEntry> {
        let count = self.state.tasks.len();
        self.state
            .tasks
            .get_mut(index)
            .ok_or_else(|| anyhow!("There is no task {} (the planner has {count})", index + 1))
    }

    fn refresh_progress(&mut self) {
        self.progress = Progress::of(&self.state.tasks);
    }

    fn refresh_completed(&mut self) {
        self.completed = summary::completed_tasks(&self.state.tasks);
    }

    /// A failed save keeps the in-memory planner and is remembered through
    /// [Self::has_unsaved_changes].
    async fn persist(&mut self) {
        if self.load_failed {
            warn!("Saved planner couldn't be read, so it is not overwritten");
            self.unsaved = true;
            return;
        }
        match self.gateway.save(&self.state).await {
            Ok(()) => self.unsaved = false,
            Err(e) => {
                warn!("Failed to save planner {e:?}");
                self.unsaved = true;
            }
        }
    }
}
