//! Interactive command loop for Taskbook.
//!
//! A [`Session`] owns the task store for the lifetime of the program. Each
//! turn it prints the menu, reads one line, runs exactly one command against
//! the store and prints the outcome. The session is generic over its input
//! and output so it can be driven from tests as well as from a terminal.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::config::ResolvedConfig;
use crate::models::{NewTask, Task, TaskUpdate, UNSET_DUE_DATE, parse_due_date, split_tags};
use crate::storage::TaskFile;
use crate::store::TaskStore;
use crate::sync::SyncClient;
use crate::{Error, Result};

/// One entry of the fixed menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Add,
    View,
    Edit,
    Delete,
    Filter,
    Overdue,
    Sync,
    Save,
    Exit,
}

impl MenuCommand {
    /// All commands in menu order.
    pub const ALL: [MenuCommand; 9] = [
        MenuCommand::Add,
        MenuCommand::View,
        MenuCommand::Edit,
        MenuCommand::Delete,
        MenuCommand::Filter,
        MenuCommand::Overdue,
        MenuCommand::Sync,
        MenuCommand::Save,
        MenuCommand::Exit,
    ];

    /// Parse a menu selection ("1" through "9").
    pub fn parse(input: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.number().to_string() == input)
    }

    /// Menu number of this command.
    pub fn number(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0) + 1
    }

    fn label(&self) -> &'static str {
        match self {
            MenuCommand::Add => "ADD - Add a new task",
            MenuCommand::View => "VIEW - View all tasks",
            MenuCommand::Edit => "EDIT - Edit a task",
            MenuCommand::Delete => "DELETE - Delete a task",
            MenuCommand::Filter => "FILTER - Filter tasks",
            MenuCommand::Overdue => "OVERDUE - Check overdue tasks",
            MenuCommand::Sync => "SYNC - Sync tasks with server",
            MenuCommand::Save => "SAVE - Save tasks",
            MenuCommand::Exit => "EXIT - Exit the program",
        }
    }
}

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Exiting,
}

/// Full detail block for one task, as shown by view and filter.
pub fn format_task(task: &Task) -> String {
    format!(
        "ID: {}\nTitle: {}\nStatus: {}\nPriority: {}\nDue Date: {}\nCategory: {}\nDescription: {}\nTags: {}\n\n",
        task.id,
        task.title,
        task.status_label(),
        task.priority,
        task.due_date_string(),
        task.category,
        task.description,
        task.tags.join(", ")
    )
}

/// Short block for one task, as shown by the overdue check.
pub fn format_overdue(task: &Task) -> String {
    format!(
        "ID: {}\nTitle: {}\nDue Date: {}\n\n",
        task.id,
        task.title,
        task.due_date_string()
    )
}

/// An interactive session over a task store.
pub struct Session<R, W> {
    store: TaskStore,
    file: TaskFile,
    sync: SyncClient,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(store: TaskStore, file: TaskFile, sync: SyncClient, input: R, output: W) -> Self {
        Self {
            store,
            file,
            sync,
            input,
            output,
        }
    }

    /// Build a session from resolved configuration and load the task file.
    ///
    /// A task file that cannot be read is reported on `output` and the
    /// session starts with an empty store.
    pub fn open(config: &ResolvedConfig, input: R, mut output: W) -> Result<Self> {
        let file = TaskFile::new(config.data_file());
        let tasks = match file.load() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(path = %file.path().display(), error = %e, "could not load tasks");
                match e {
                    Error::Io(_) => writeln!(output, "Error opening file: {}", e)?,
                    _ => writeln!(output, "Error reading from file: {}", e)?,
                }
                Vec::new()
            }
        };
        let store = TaskStore::with_tasks(tasks, config.id_policy());
        let sync = SyncClient::new(config.sync_url(), config.sync_timeout());
        Ok(Self::new(store, file, sync, input, output))
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Consume the session, returning the store and output.
    pub fn into_parts(self) -> (TaskStore, W) {
        (self.store, self.output)
    }

    /// Run until the exit command or end of input.
    pub fn run(&mut self) -> Result<()> {
        while self.step()? == SessionState::Running {}
        Ok(())
    }

    /// Print the menu, read one selection and execute it.
    ///
    /// End of input is treated as the exit command.
    pub fn step(&mut self) -> Result<SessionState> {
        self.print_menu()?;
        let Some(line) = self.read_line()? else {
            debug!("end of input, exiting");
            return self.execute(MenuCommand::Exit);
        };

        match MenuCommand::parse(&line) {
            Some(command) => self.execute(command),
            None => {
                writeln!(self.output, "Invalid command number. Please try again.")?;
                Ok(SessionState::Running)
            }
        }
    }

    /// Execute one menu command.
    pub fn execute(&mut self, command: MenuCommand) -> Result<SessionState> {
        debug!(command = command.number(), "executing command");
        match command {
            MenuCommand::Add => self.add_task()?,
            MenuCommand::View => self.view_tasks()?,
            MenuCommand::Edit => self.edit_task()?,
            MenuCommand::Delete => self.delete_task()?,
            MenuCommand::Filter => self.filter_tasks()?,
            MenuCommand::Overdue => self.check_overdue()?,
            MenuCommand::Sync => self.sync_tasks()?,
            MenuCommand::Save => self.save_tasks()?,
            MenuCommand::Exit => {
                writeln!(self.output, "Exiting...")?;
                self.save_tasks()?;
                return Ok(SessionState::Exiting);
            }
        }
        Ok(SessionState::Running)
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output, "\nCommands:")?;
        for command in MenuCommand::ALL {
            writeln!(self.output, "{}. {}", command.number(), command.label())?;
        }
        write!(self.output, "Enter command number: ")?;
        self.output.flush()?;
        Ok(())
    }

    /// Read one trimmed line. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Show a prompt and read the answer. End of input reads as empty.
    fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    /// Read a task ID. Unparseable input yields `None`, which never matches.
    fn prompt_id(&mut self, label: &str) -> Result<Option<u64>> {
        Ok(self.prompt(label)?.parse().ok())
    }

    fn add_task(&mut self) -> Result<()> {
        writeln!(self.output, "\nAdding a new task")?;
        let title = self.prompt("Task title: ")?;
        let priority = self.prompt("Priority: ")?;
        let due_raw = self.prompt("Due date (format yyyy-mm-dd): ")?;
        let category = self.prompt("Category: ")?;
        let description = self.prompt("Task description: ")?;
        let tags = self.prompt("Tags (comma separated): ")?;

        let due_date = parse_due_date(&due_raw).unwrap_or_else(|e| {
            warn!(error = %e, "storing unset due date");
            UNSET_DUE_DATE
        });

        let task = NewTask::new(title)
            .with_priority(priority)
            .with_due_date(due_date)
            .with_category(category)
            .with_description(description)
            .with_tags(split_tags(&tags));
        self.store.add(task);

        writeln!(self.output, "Task added successfully.")?;
        Ok(())
    }

    fn view_tasks(&mut self) -> Result<()> {
        writeln!(self.output, "\nTasks:")?;
        for task in self.store.list_all() {
            write!(self.output, "{}", format_task(task))?;
        }
        Ok(())
    }

    fn edit_task(&mut self) -> Result<()> {
        let id = self.prompt_id("Enter the ID of the task to edit: ")?;
        let Some(id) = id.filter(|id| self.store.find_by_id(*id).is_ok()) else {
            writeln!(self.output, "Task with this ID not found.")?;
            return Ok(());
        };

        writeln!(self.output, "\nEditing task")?;
        let update = TaskUpdate {
            title: Some(self.prompt("New title (leave empty to keep current): ")?),
            priority: Some(self.prompt("New priority (leave empty to keep current): ")?),
            due_date: Some(self.prompt(
                "New due date (format yyyy-mm-dd) (leave empty to keep current): ",
            )?),
            category: Some(self.prompt("New category (leave empty to keep current): ")?),
            description: Some(self.prompt("New description (leave empty to keep current): ")?),
            tags: Some(self.prompt("New tags (comma separated) (leave empty to keep current): ")?),
        };

        match self.store.update_by_id(id, update) {
            Ok(_) => writeln!(self.output, "Task edited successfully.")?,
            Err(Error::NotFound(_)) => writeln!(self.output, "Task with this ID not found.")?,
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn delete_task(&mut self) -> Result<()> {
        let id = self.prompt_id("Enter the ID of the task to delete: ")?;
        match id.map(|id| self.store.delete_by_id(id)) {
            Some(Ok(_)) => writeln!(self.output, "Task deleted successfully.")?,
            Some(Err(Error::NotFound(_))) | None => {
                writeln!(self.output, "Task with this ID not found.")?
            }
            Some(Err(e)) => return Err(e),
        }
        Ok(())
    }

    fn filter_tasks(&mut self) -> Result<()> {
        let query = self.prompt("Enter filter (priority, due date, or keyword): ")?;
        writeln!(self.output, "\nFilter results:")?;
        for task in self.store.filter(&query) {
            write!(self.output, "{}", format_task(task))?;
        }
        Ok(())
    }

    fn check_overdue(&mut self) -> Result<()> {
        writeln!(self.output, "\nOverdue tasks:")?;
        for task in self.store.overdue() {
            write!(self.output, "{}", format_overdue(task))?;
        }
        Ok(())
    }

    fn sync_tasks(&mut self) -> Result<()> {
        match self.sync.push(self.store.list_all()) {
            Ok(()) => writeln!(self.output, "Tasks successfully synced with the server.")?,
            Err(Error::Json(e)) => writeln!(self.output, "Error converting data to JSON: {}", e)?,
            Err(e) => writeln!(self.output, "Error syncing with server: {}", e)?,
        }
        Ok(())
    }

    fn save_tasks(&mut self) -> Result<()> {
        match self.file.save(self.store.list_all()) {
            Ok(()) => writeln!(self.output, "Tasks successfully saved.")?,
            Err(e) => {
                warn!(path = %self.file.path().display(), error = %e, "save failed");
                writeln!(self.output, "Error writing to file: {}", e)?
            }
        }
        Ok(())
    }
}
