//! Buffer of move requests awaiting resolution.

use cellgrid_core::MoveRequest;

/// Requests submitted since the last resolution pass.
#[derive(Debug, Default)]
pub(crate) struct MoveQueue {
    requests: Vec<MoveRequest>,
}

impl MoveQueue {
    pub(crate) fn push(&mut self, request: MoveRequest) {
        self.requests.push(request);
    }

    pub(crate) fn len(&self) -> usize {
        self.requests.len()
    }

    /// Empties the queue, yielding requests ordered by entity. The sort is
    /// stable so requests from one entity keep their submission order.
    pub(crate) fn drain_sorted(&mut self) -> Vec<MoveRequest> {
        self.requests.sort_by_key(|request| request.entity);
        self.requests.drain(..).collect()
    }
}
