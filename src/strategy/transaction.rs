use tracing::debug;

use crate::market::Journaled;

/// Scoped all-or-nothing boundary over the market and the settlement asset.
///
/// Both collaborators are checkpointed on [`begin`](Transaction::begin).
/// Dropping the guard without [`commit`](Transaction::commit) reverts both.
pub(crate) struct Transaction<'a, M: Journaled, A: Journaled> {
    market: &'a mut M,
    asset: &'a mut A,
    checkpoints: Option<(M::Checkpoint, A::Checkpoint)>,
}

impl<'a, M: Journaled, A: Journaled> Transaction<'a, M, A> {
    pub fn begin(market: &'a mut M, asset: &'a mut A) -> Self {
        let m = market.checkpoint();
        let a = asset.checkpoint();
        Transaction {
            market,
            asset,
            checkpoints: Some((m, a)),
        }
    }

    pub fn market(&mut self) -> &mut M {
        &mut *self.market
    }

    pub fn asset(&mut self) -> &mut A {
        &mut *self.asset
    }

    /// Both collaborators at once, for calls where the market moves funds.
    pub fn parts(&mut self) -> (&mut M, &mut A) {
        (&mut *self.market, &mut *self.asset)
    }

    pub fn commit(mut self) {
        if let Some((m, a)) = self.checkpoints.take() {
            self.market.commit(m);
            self.asset.commit(a);
        }
    }
}

impl<M: Journaled, A: Journaled> Drop for Transaction<'_, M, A> {
    fn drop(&mut self) {
        if let Some((m, a)) = self.checkpoints.take() {
            self.asset.revert_to(a);
            self.market.revert_to(m);
            debug!("transaction rolled back");
        }
    }
}
