//! A hand-written contract used by this crate's unit tests.

use crate::{proxy::DispatchProxy, testing::CallLog};
use fanout_core::{BoxError, Contract, MethodId, MethodSet};

pub(crate) trait Table: Send + Sync {
    fn did_select(&self, _row: usize) {}

    fn height_for_row(&self, _row: usize) -> Option<u32> {
        None
    }

    fn commit(&self, _row: usize) -> Result<(), BoxError> {
        Ok(())
    }

    fn title_for(&self, _row: usize) -> Result<Option<String>, BoxError> {
        Ok(None)
    }

    fn responds_to(&self) -> MethodSet {
        MethodSet::all()
    }
}

pub(crate) struct TableMethods;

impl TableMethods {
    pub(crate) const DID_SELECT: MethodId = MethodId::new(0, "did_select");
    pub(crate) const HEIGHT_FOR_ROW: MethodId = MethodId::new(1, "height_for_row");
    pub(crate) const COMMIT: MethodId = MethodId::new(2, "commit");
    pub(crate) const TITLE_FOR: MethodId = MethodId::new(3, "title_for");
}

impl Contract for dyn Table {
    const NAME: &'static str = "Table";
    const METHODS: &'static [&'static str] = &["did_select", "height_for_row", "commit", "title_for"];

    fn capabilities(&self) -> MethodSet {
        self.responds_to()
    }
}

impl Table for DispatchProxy<dyn Table> {
    fn did_select(&self, row: usize) {
        self.notify(TableMethods::DID_SELECT, |l| l.did_select(row));
    }

    fn height_for_row(&self, row: usize) -> Option<u32> {
        self.query(TableMethods::HEIGHT_FOR_ROW, |l| l.height_for_row(row))
    }

    fn commit(&self, row: usize) -> Result<(), BoxError> {
        self.notify_fallible(TableMethods::COMMIT, |l| l.commit(row))
    }

    fn title_for(&self, row: usize) -> Result<Option<String>, BoxError> {
        self.query_fallible(TableMethods::TITLE_FOR, |l| l.title_for(row))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Mode {
    #[default]
    Normal,
    Fail,
    Panic,
}

/// A listener that logs every call as `name:method(row)`.
#[derive(Default)]
pub(crate) struct Counter {
    name: &'static str,
    log: CallLog,
    height: Option<u32>,
    mode: Mode,
    capabilities: MethodSet,
}

impl Counter {
    pub(crate) fn named(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: log.clone(),
            ..Self::default()
        }
    }

    pub(crate) fn responding(capabilities: MethodSet) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    pub(crate) fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub(crate) fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn with_capabilities(mut self, capabilities: MethodSet) -> Self {
        self.capabilities = capabilities;
        self
    }

    fn record(&self, method: &str, row: usize) {
        self.log.record(format!("{}:{}({})", self.name, method, row));
        if self.mode == Mode::Panic {
            panic!("{} exploded", self.name);
        }
    }
}

impl Table for Counter {
    fn did_select(&self, row: usize) {
        self.record("did_select", row);
    }

    fn height_for_row(&self, row: usize) -> Option<u32> {
        self.record("height_for_row", row);
        self.height
    }

    fn commit(&self, row: usize) -> Result<(), BoxError> {
        self.record("commit", row);
        match self.mode {
            Mode::Fail => Err(format!("{} refused commit", self.name).into()),
            _ => Ok(()),
        }
    }

    fn title_for(&self, row: usize) -> Result<Option<String>, BoxError> {
        self.record("title_for", row);
        match self.mode {
            Mode::Fail => Err(format!("{} has no titles", self.name).into()),
            _ => Ok(self.height.map(|h| format!("{}-{}", self.name, h))),
        }
    }

    fn responds_to(&self) -> MethodSet {
        self.capabilities
    }
}
