//! Black-box-flavored end-to-end scenarios, one file per scenario, driven
//! entirely through the public `ao-engine`/`ao-adapters` surface -- no
//! crate-internal access, since there's no CLI or socket layer to spawn a
//! binary against (ao-daemon exposes the same operations as plain async
//! methods, as `mod prelude` sets up).

mod prelude;

mod ci_failed_retries;
mod escalation_to_human;
mod restore_from_archive;
mod reviewer_gate_happy_path;
mod spawn_and_merge;
mod verifier_gate;
