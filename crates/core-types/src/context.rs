use crate::events::ProtocolEvent;
use crate::{Address, Timestamp};
use tracing::trace;

/// The envelope every state-changing call runs inside.
///
/// It carries the identity of the caller and the block of time the call
/// executes at, and it buffers the events the call emits. Nothing in the
/// buffer is published until the surrounding transaction commits, so a
/// rejected call never leaks an event.
#[derive(Debug, Clone)]
pub struct CallContext {
    caller: Address,
    now: Timestamp,
    events: Vec<ProtocolEvent>,
}

impl CallContext {
    pub fn new(caller: Address, now: Timestamp) -> Self {
        Self {
            caller,
            now,
            events: Vec::new(),
        }
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn emit(&mut self, event: impl Into<ProtocolEvent>) {
        self.events.push(event.into());
    }

    pub fn events(&self) -> &[ProtocolEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<ProtocolEvent> {
        self.events
    }

    /// Runs `f` with `caller` as the acting identity, then restores the
    /// original caller. Used when one component calls into another.
    pub fn delegate<T>(&mut self, caller: Address, f: impl FnOnce(&mut Self) -> T) -> T {
        let original = std::mem::replace(&mut self.caller, caller);
        trace!(from = %original, to = %caller, "delegating call");
        let result = f(self);
        self.caller = original;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::VaultEvent;

    #[test]
    fn delegate_swaps_and_restores_caller() {
        let user = Address::repeat_byte(1);
        let vault = Address::repeat_byte(2);
        let mut ctx = CallContext::new(user, 42);

        let seen = ctx.delegate(vault, |inner| {
            inner.emit(VaultEvent::Paused { account: inner.caller() });
            inner.caller()
        });

        assert_eq!(seen, vault);
        assert_eq!(ctx.caller(), user);
        assert_eq!(ctx.now(), 42);
        assert_eq!(ctx.events().len(), 1);
    }
}
