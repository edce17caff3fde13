/*! Analyzer behaviour over whole routines.
 *
 * Unit tests next to each module cover the tables in isolation. These build small routines with the
 * builder API and check what the analyzer records for them end to end: alias versions, branch tags,
 * call binding, naming, and the state machine around a run.
 */

mod call_tests;
mod state_tests;
