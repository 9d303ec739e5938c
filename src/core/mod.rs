// This file is the module declaration file for the `core` module.
// Everything that drives a command end to end lives here; the `builders`
// module supplies the pieces.

// `config` module:
// The `AcaConfig` data structures, the `ConfigProvider` trait and the
// `ConfigManager` that loads, saves and validates the configuration file.
pub mod config;

// `engine` module:
// `AcaEngine`, which wires fetcher, selector, scanner, toggler, store and
// publisher together for each command.
pub mod engine;

// `fetcher` module:
// Obtains a local copy of a remote repository in a scratch directory that
// is removed when dropped.
pub mod fetcher;

// `git` module:
// Local repository operations through `git2`: branches, staging, commits
// and remote branch checkout.
pub mod git;

// `publisher` module:
// Commits a changed working tree, pushes it and optionally opens a pull
// request.
pub mod publisher;

// `scanner` module:
// Finds IP/port assignments in file contents.
pub mod scanner;

// `toggle` module:
// Flips binary adapter values in properties content.
pub mod toggle;
