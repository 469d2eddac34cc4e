//! Handler dispatch: one background unit per handler, failures reported, never propagated.

mod dispatcher;

pub(crate) use dispatcher::{Dispatcher, Reporter};
