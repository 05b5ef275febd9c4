use log::debug;
use tokio::sync::watch;

/// Ordered, in-memory list of task descriptions.
///
/// Duplicates are allowed. Removal by value takes out the first matching entry only.
pub struct TaskStore {
    tasks: Vec<String>,
    snapshots: watch::Sender<Vec<String>>,
}

impl TaskStore {
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(Vec::new());
        Self {
            tasks: Vec::new(),
            snapshots,
        }
    }

    /// Append `text` unless it is blank after trimming. Returns whether it was added.
    ///
    /// The text is stored as given, surrounding whitespace included.
    pub fn add_task(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            debug!("Ignoring blank task");
            return false;
        }

        self.tasks.push(text.to_string());
        self.publish();
        true
    }

    /// Remove the first task equal to `text`. Returns whether anything was removed.
    pub fn remove_task(&mut self, text: &str) -> bool {
        match self.tasks.iter().position(|task| task == text) {
            Some(index) => {
                self.tasks.remove(index);
                self.publish();
                true
            }
            None => false,
        }
    }

    /// Read-only view of the tasks in insertion order.
    pub fn list(&self) -> &[String] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Observe the list; every change publishes a fresh snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.snapshots.subscribe()
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.tasks.clone());
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
