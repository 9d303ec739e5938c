// This file is the module declaration file for the `builders` module.
// It declares the building blocks the `core` engines are assembled from:
// line classification, output rendering, file selection, adapter storage
// and input validation.

// `matchers` module:
// IPv4/IPv6 detection and the free-form `...port=NNNN` search used when a
// line is not a plain key/value pair.
pub mod matchers;

// `patterns` module:
// The key/value line grammar shared by the scanner and the properties
// editor, plus comment detection and quote stripping.
pub mod patterns;

// `properties` module:
// A line-preserving view of a `.properties` file that can rewrite single
// assignments without touching any other line.
pub mod properties;

// `reporter` module:
// Renders scan findings and adapter changes as CSV, an aligned text table
// or JSON through the `ReportRenderer` trait.
pub mod reporter;

// `selector` module:
// Walks a checkout and picks files by include/exclude glob lists through
// the `FileSelector` trait.
pub mod selector;

// `storage` module:
// Persists the reusable adapter list behind the `AdapterStore` trait, with
// a file-backed and an in-memory implementation.
pub mod storage;

// `validator` module:
// Checks configuration files and command inputs such as repository
// identifiers, environment names and adapter names.
pub mod validator;
