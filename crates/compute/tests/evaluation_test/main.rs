/// Integration tests for the evaluation pipeline covering the documented
/// adjustment scenarios, exhaustive adjustment/metric properties, and
/// end-to-end POT evaluation.

mod helpers;
mod pot;
mod properties;
mod scenarios;
