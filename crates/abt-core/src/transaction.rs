/// Checkpoint/rollback seam shared by the market's collaborators.
///
/// A trade checkpoints the ledger and the escrow, applies its effects, and
/// then either commits or rolls both back. Hosts with native transactions map
/// `checkpoint` to a savepoint, `rollback` to rolling back to it and `commit`
/// to releasing it.
///
/// Checkpoints nest: every `checkpoint` must be closed by exactly one
/// `commit` or `rollback`, innermost first.
pub trait Transactional {
    type Checkpoint;

    fn checkpoint(&mut self) -> Self::Checkpoint;

    fn rollback(&mut self, checkpoint: Self::Checkpoint);

    fn commit(&mut self, checkpoint: Self::Checkpoint);
}
