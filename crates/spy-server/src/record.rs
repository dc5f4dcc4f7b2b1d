//! The recording installer: wraps a fixture's chain with a spy-updating step.

use std::sync::Arc;

use crate::chain::Step;
use crate::fixture::Fixture;
use crate::spy::Spy;

/// Produce a fresh [`Spy`] and a wrapped chain for one fixture installation.
///
/// The wrapped chain is `[recording step] + copy of the fixture's chain`; the
/// fixture itself is left untouched. The recording step appends the shared
/// request to the spy and forwards — it never writes the response, never
/// short-circuits, and never looks at the body. The spy mutation completes
/// before the first await point in the chain, so recorded order is dispatch
/// order even while downstream middleware for an earlier request is still
/// pending. A request that fails downstream stays counted.
pub(crate) fn instrument(fixture: &Fixture) -> (Spy, Vec<Step>) {
    let spy = Spy::new();

    let recording: Step = {
        let spy = spy.clone();
        Arc::new(move |req, next| {
            spy.record(Arc::clone(&req));
            Box::pin(next.run(req))
        })
    };

    let mut wrapped = Vec::with_capacity(fixture.chain().len() + 1);
    wrapped.push(recording);
    wrapped.extend(fixture.chain().iter().cloned());

    (spy, wrapped)
}
