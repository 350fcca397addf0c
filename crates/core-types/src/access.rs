use crate::{Address, CallContext, ProtocolError};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Owner and pause switch shared by the three core components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    owner: Address,
    paused: bool,
}

impl Ownership {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            paused: false,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn ensure_owner(&self, ctx: &CallContext) -> Result<(), ProtocolError> {
        if ctx.caller() != self.owner {
            return Err(ProtocolError::NotOwner);
        }
        Ok(())
    }

    pub fn ensure_not_paused(&self) -> Result<(), ProtocolError> {
        if self.paused {
            return Err(ProtocolError::Paused);
        }
        Ok(())
    }

    /// Owner-only. Returns the previous owner.
    pub fn transfer(&mut self, ctx: &CallContext, new_owner: Address) -> Result<Address, ProtocolError> {
        self.ensure_owner(ctx)?;
        if new_owner.is_zero() {
            return Err(ProtocolError::InvalidAddress);
        }
        let previous = std::mem::replace(&mut self.owner, new_owner);
        info!(%previous, %new_owner, "ownership transferred");
        Ok(previous)
    }

    /// Owner-only. Pausing an already paused component is rejected.
    pub fn pause(&mut self, ctx: &CallContext) -> Result<(), ProtocolError> {
        self.ensure_owner(ctx)?;
        self.ensure_not_paused()?;
        self.paused = true;
        info!(owner = %self.owner, "paused");
        Ok(())
    }

    /// Owner-only.
    pub fn unpause(&mut self, ctx: &CallContext) -> Result<(), ProtocolError> {
        self.ensure_owner(ctx)?;
        if !self.paused {
            return Err(ProtocolError::NotPaused);
        }
        self.paused = false;
        info!(owner = %self.owner, "unpaused");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_owner_toggles_pause() {
        let owner = Address::repeat_byte(1);
        let stranger = Address::repeat_byte(2);
        let mut access = Ownership::new(owner);

        assert_eq!(
            access.pause(&CallContext::new(stranger, 0)),
            Err(ProtocolError::NotOwner)
        );
        access.pause(&CallContext::new(owner, 0)).unwrap();
        assert!(access.is_paused());
        assert_eq!(access.ensure_not_paused(), Err(ProtocolError::Paused));
        access.unpause(&CallContext::new(owner, 0)).unwrap();
        assert_eq!(
            access.unpause(&CallContext::new(owner, 0)),
            Err(ProtocolError::NotPaused)
        );
    }

    #[test]
    fn transfer_rejects_zero_address() {
        let owner = Address::repeat_byte(1);
        let mut access = Ownership::new(owner);
        let ctx = CallContext::new(owner, 0);

        assert_eq!(access.transfer(&ctx, Address::ZERO), Err(ProtocolError::InvalidAddress));
        let previous = access.transfer(&ctx, Address::repeat_byte(9)).unwrap();
        assert_eq!(previous, owner);
        assert_eq!(access.owner(), Address::repeat_byte(9));
    }
}
