//! Constant combinators.

use std::marker::PhantomData;

use crate::signal::SignalValue;
use serde::Serialize;

use crate::color::{Green, Red, RedGreen};
use crate::error::AlgebraError;

/// Number of filter slots on a constant combinator.
pub const SLOTS: usize = 18;

/// The slots of a constant combinator. Empty slots are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConstComData {
    pub slots: [Option<SignalValue>; SLOTS],
}

impl ConstComData {
    /// Present slots with their 0-based index.
    pub fn filled(&self) -> impl Iterator<Item = (usize, SignalValue)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|v| (i, v)))
    }
}

/// A constant combinator whose output drives the networks named by `C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstCom<C = RedGreen> {
    data: ConstComData,
    color: PhantomData<C>,
}

impl<C> ConstCom<C> {
    pub fn data(&self) -> &ConstComData {
        &self.data
    }
}

impl ConstCom {
    /// Fill slots in order from `values`.
    pub fn new(values: impl IntoIterator<Item = SignalValue>) -> Result<Self, AlgebraError> {
        let values: Vec<SignalValue> = values.into_iter().collect();
        if values.len() > SLOTS {
            return Err(AlgebraError::TooManySignals {
                count: values.len(),
                max: SLOTS,
            });
        }
        let mut slots = [None; SLOTS];
        for (slot, value) in slots.iter_mut().zip(values) {
            *slot = Some(value);
        }
        Ok(Self::from_slots(slots))
    }

    pub fn from_slots(slots: [Option<SignalValue>; SLOTS]) -> Self {
        Self {
            data: ConstComData { slots },
            color: PhantomData,
        }
    }

    /// Set or clear a single slot.
    pub fn set(&mut self, index: usize, value: Option<SignalValue>) -> Result<(), AlgebraError> {
        let slot = self
            .data
            .slots
            .get_mut(index)
            .ok_or(AlgebraError::SlotOutOfRange {
                index,
                max: SLOTS - 1,
            })?;
        *slot = value;
        Ok(())
    }

    pub fn r(self) -> ConstCom<Red> {
        ConstCom {
            data: self.data,
            color: PhantomData,
        }
    }

    pub fn g(self) -> ConstCom<Green> {
        ConstCom {
            data: self.data,
            color: PhantomData,
        }
    }
}
