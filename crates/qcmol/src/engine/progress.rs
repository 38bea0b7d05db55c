/// Events emitted while a batch of molecules is being compared.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    BatchStart { molecules: usize, total_pairs: u64 },
    PairCompared {
        earlier: usize,
        later: usize,
        equivalent: bool,
    },
    BatchFinish { unique: usize },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
