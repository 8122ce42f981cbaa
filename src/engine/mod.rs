//! Engine modules: the persistence authority behind the console.
//!
//! The console never touches the backing file directly. It reads and mutates
//! entities through [`storage::FileStorage`], which owns the object set and
//! rewrites the whole document on every save.

pub mod storage;
