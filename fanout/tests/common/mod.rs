#![allow(dead_code)]

use fanout::{BoxError, DelegateHost, DispatchProxy, MethodSet, testing::CallLog};
use std::sync::{Arc, RwLock};

// ============================================================================
// Test Contracts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("row {0} is read-only")]
    ReadOnly(usize),
}

#[fanout::delegate]
pub trait TableDelegate {
    fn did_select(&self, _row: usize) {}

    fn will_display(&self, _row: usize, _title: &str) {}

    fn height_for_row(&self, _row: usize) -> Option<f32> {
        None
    }

    fn commit(&self, _row: usize) -> Result<(), TableError> {
        Ok(())
    }

    fn title_for(&self, _row: usize) -> Result<Option<String>, TableError> {
        Ok(None)
    }
}

#[fanout::delegate(name = "Scroll")]
pub trait ScrollDelegate {
    fn did_scroll(&self, _offset: u32) {}
}

// ============================================================================
// Test Host
// ============================================================================

pub const DEFAULT_HEIGHT: f32 = 44.0;

/// A host with one delegate slot per contract, like a UI table view.
#[derive(Default)]
pub struct TableView {
    delegate: RwLock<Option<Arc<dyn TableDelegate>>>,
    scroll_delegate: RwLock<Option<Arc<dyn ScrollDelegate>>>,
}

impl TableView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn delegate(&self) -> Option<Arc<dyn TableDelegate>> {
        self.delegate.read().unwrap().clone()
    }

    pub fn scroll_delegate(&self) -> Option<Arc<dyn ScrollDelegate>> {
        self.scroll_delegate.read().unwrap().clone()
    }

    pub fn select(&self, row: usize) {
        if let Some(delegate) = self.delegate() {
            delegate.did_select(row);
        }
    }

    pub fn height(&self, row: usize) -> f32 {
        self.delegate()
            .and_then(|d| d.height_for_row(row))
            .unwrap_or(DEFAULT_HEIGHT)
    }

    pub fn scroll(&self, offset: u32) {
        if let Some(delegate) = self.scroll_delegate() {
            delegate.did_scroll(offset);
        }
    }
}

impl DelegateHost<dyn TableDelegate> for TableView {
    fn install_delegate(&self, proxy: Arc<DispatchProxy<dyn TableDelegate>>) -> Result<(), BoxError> {
        *self.delegate.write().unwrap() = Some(proxy);
        Ok(())
    }
}

impl DelegateHost<dyn ScrollDelegate> for TableView {
    fn install_delegate(
        &self,
        proxy: Arc<DispatchProxy<dyn ScrollDelegate>>,
    ) -> Result<(), BoxError> {
        *self.scroll_delegate.write().unwrap() = Some(proxy);
        Ok(())
    }
}

// ============================================================================
// Test Listener
// ============================================================================

/// A listener that logs every call as `name:method(arg)`.
pub struct Recorder {
    name: &'static str,
    log: CallLog,
    height: Option<f32>,
    title: Option<String>,
    read_only: bool,
    panics: bool,
    capabilities: MethodSet,
}

impl Recorder {
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: log.clone(),
            height: None,
            title: None,
            read_only: false,
            panics: false,
            capabilities: MethodSet::all(),
        }
    }

    pub fn answering(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn responding(mut self, capabilities: impl Into<MethodSet>) -> Self {
        self.capabilities = capabilities.into();
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn record(&self, call: String) {
        self.log.record(format!("{}:{}", self.name, call));
        if self.panics {
            panic!("{} exploded", self.name);
        }
    }
}

impl TableDelegate for Recorder {
    fn did_select(&self, row: usize) {
        self.record(format!("did_select({})", row));
    }

    fn will_display(&self, row: usize, title: &str) {
        self.record(format!("will_display({}, {})", row, title));
    }

    fn height_for_row(&self, row: usize) -> Option<f32> {
        self.record(format!("height_for_row({})", row));
        self.height
    }

    fn commit(&self, row: usize) -> Result<(), TableError> {
        self.record(format!("commit({})", row));
        if self.read_only {
            return Err(TableError::ReadOnly(row));
        }
        Ok(())
    }

    fn title_for(&self, row: usize) -> Result<Option<String>, TableError> {
        self.record(format!("title_for({})", row));
        if self.read_only {
            return Err(TableError::ReadOnly(row));
        }
        Ok(self.title.clone())
    }

    fn responds_to(&self) -> MethodSet {
        self.capabilities
    }
}

impl ScrollDelegate for Recorder {
    fn did_scroll(&self, offset: u32) {
        self.record(format!("did_scroll({})", offset));
    }
}

/// View a recorder through the table contract.
pub fn table(recorder: &Arc<Recorder>) -> Arc<dyn TableDelegate> {
    recorder.clone()
}

/// View a recorder through the scroll contract.
pub fn scroll(recorder: &Arc<Recorder>) -> Arc<dyn ScrollDelegate> {
    recorder.clone()
}
