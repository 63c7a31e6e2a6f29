mod dispatcher;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
