mod submissions;

pub use submissions::scope;
