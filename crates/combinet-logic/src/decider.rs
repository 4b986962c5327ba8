//! Decider combinator algebra.
//!
//! A decider is written as an input condition followed by an output:
//!
//! ```
//! use combinet_logic::{DeciOperand, DeciOutputTarget, Each, INPUT, Then};
//!
//! // Forward every positive signal unchanged.
//! let pass = Each.gt(0).then(Each.out(INPUT));
//! assert_eq!(pass.data().value, None);
//! ```
//!
//! Which inputs may be paired with which outputs is enforced by the [`Then`]
//! impls. Pairing an `each` input with an `everything` output does not compile:
//!
//! ```compile_fail
//! use combinet_logic::{All, DeciOperand, DeciOutputTarget, Each, INPUT, Then};
//!
//! let bad = Each.gt(0).then(All.out(INPUT));
//! ```
//!
//! Operands whose shape is only known at runtime ([`DeciLeft`],
//! [`DeciOutputType`], [`WildCard`]) go through the same impls but return a
//! `Result`.

use std::marker::PhantomData;
use std::ops::Deref;

use crate::signal::Signal;
use serde::{Deserialize, Serialize};

use crate::ModeDescription;
use crate::color::{Green, Red, RedGreen};
use crate::error::AlgebraError;
use crate::wildcard::{All, Any, Each, WildCard};

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Decider comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeciMode {
    Lt,
    Gt,
    Eq,
    Ge,
    Le,
    Ne,
}

static DECI_MODES: [ModeDescription; 6] = [
    ModeDescription { name: "smaller", code_syntax: "lt", game_syntax: "<", index: 0 },
    ModeDescription { name: "greater", code_syntax: "gt", game_syntax: ">", index: 1 },
    ModeDescription { name: "equal", code_syntax: "eq", game_syntax: "=", index: 2 },
    ModeDescription { name: "greater_equal", code_syntax: "ge", game_syntax: "≥", index: 3 },
    ModeDescription { name: "smaller_equal", code_syntax: "le", game_syntax: "≤", index: 4 },
    ModeDescription { name: "not_equal", code_syntax: "ne", game_syntax: "≠", index: 5 },
];

impl DeciMode {
    pub const ALL: [DeciMode; 6] = [
        DeciMode::Lt,
        DeciMode::Gt,
        DeciMode::Eq,
        DeciMode::Ge,
        DeciMode::Le,
        DeciMode::Ne,
    ];

    pub fn description(self) -> &'static ModeDescription {
        &DECI_MODES[self as usize]
    }

    pub fn game_syntax(self) -> &'static str {
        self.description().game_syntax
    }

    pub fn from_game_syntax(syntax: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.game_syntax() == syntax)
    }

    pub fn compare(self, left: i32, right: i32) -> bool {
        match self {
            DeciMode::Lt => left < right,
            DeciMode::Gt => left > right,
            DeciMode::Eq => left == right,
            DeciMode::Ge => left >= right,
            DeciMode::Le => left <= right,
            DeciMode::Ne => left != right,
        }
    }
}

// ---------------------------------------------------------------------------
// Operands
// ---------------------------------------------------------------------------

/// Left side of a decider condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeciLeft {
    Any,
    All,
    Each,
    Signal(Signal),
}

impl DeciLeft {
    /// True if this operand is exactly `signal`.
    pub fn is_signal(self, signal: Signal) -> bool {
        matches!(self, DeciLeft::Signal(s) if s == signal)
    }

    pub fn wildcard(self) -> Option<WildCard> {
        match self {
            DeciLeft::Any => Some(WildCard::Any),
            DeciLeft::All => Some(WildCard::All),
            DeciLeft::Each => Some(WildCard::Each),
            DeciLeft::Signal(_) => None,
        }
    }

    pub fn matches_wildcard(self, wildcard: WildCard) -> bool {
        self.wildcard() == Some(wildcard)
    }

    fn same_operand(self, right: DeciRight) -> bool {
        match right {
            DeciRight::Signal(s) => self.is_signal(s),
            DeciRight::Constant(_) => false,
        }
    }
}

/// Right side of a decider condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeciRight {
    Constant(i32),
    Signal(Signal),
}

/// What a decider emits when its condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeciOutputType {
    All,
    Each,
    Signal(Signal),
}

/// `None` copies the count from the input.
pub type DeciOutputValue = Option<i32>;

/// Output value that copies the count from the input.
pub const INPUT: DeciOutputValue = None;

impl From<Signal> for DeciLeft {
    fn from(s: Signal) -> Self {
        DeciLeft::Signal(s)
    }
}

impl From<Any> for DeciLeft {
    fn from(_: Any) -> Self {
        DeciLeft::Any
    }
}

impl From<All> for DeciLeft {
    fn from(_: All) -> Self {
        DeciLeft::All
    }
}

impl From<Each> for DeciLeft {
    fn from(_: Each) -> Self {
        DeciLeft::Each
    }
}

impl From<WildCard> for DeciLeft {
    fn from(w: WildCard) -> Self {
        match w {
            WildCard::Any => DeciLeft::Any,
            WildCard::All => DeciLeft::All,
            WildCard::Each => DeciLeft::Each,
        }
    }
}

impl From<i32> for DeciRight {
    fn from(v: i32) -> Self {
        DeciRight::Constant(v)
    }
}

impl From<Signal> for DeciRight {
    fn from(s: Signal) -> Self {
        DeciRight::Signal(s)
    }
}

impl From<Signal> for DeciOutputType {
    fn from(s: Signal) -> Self {
        DeciOutputType::Signal(s)
    }
}

impl From<All> for DeciOutputType {
    fn from(_: All) -> Self {
        DeciOutputType::All
    }
}

impl From<Each> for DeciOutputType {
    fn from(_: Each) -> Self {
        DeciOutputType::Each
    }
}

impl TryFrom<WildCard> for DeciOutputType {
    type Error = AlgebraError;

    fn try_from(w: WildCard) -> Result<Self, AlgebraError> {
        match w {
            WildCard::All => Ok(DeciOutputType::All),
            WildCard::Each => Ok(DeciOutputType::Each),
            WildCard::Any => Err(AlgebraError::WildcardNotAllowed {
                wildcard: w,
                position: "a decider output",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A decider condition. `L` keeps the static shape of the left operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeciInput<L> {
    pub left: L,
    pub right: DeciRight,
    pub mode: DeciMode,
}

impl<L: Into<DeciLeft>> DeciInput<L> {
    /// Forget the static shape of the left operand.
    pub fn generic(self) -> DeciInput<DeciLeft> {
        DeciInput {
            left: self.left.into(),
            right: self.right,
            mode: self.mode,
        }
    }
}

/// Result of `eq` / `ne`: usable both as a decider input and as a `bool`.
///
/// The truth value compares operands by identity, so `coal.eq(coal)` is true
/// while `coal.eq(5)` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boolable<T> {
    input: T,
    truth: bool,
}

impl<T> Boolable<T> {
    pub fn as_bool(&self) -> bool {
        self.truth
    }

    pub fn into_inner(self) -> T {
        self.input
    }
}

impl<T> Deref for Boolable<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.input
    }
}

impl<T> From<Boolable<T>> for bool {
    fn from(b: Boolable<T>) -> bool {
        b.truth
    }
}

/// Holds a left operand and a runtime-chosen mode until the right operand
/// arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeciModeHolder<L> {
    left: L,
    mode: DeciMode,
}

impl<L> DeciModeHolder<L> {
    pub fn against(self, right: impl Into<DeciRight>) -> DeciInput<L> {
        DeciInput {
            left: self.left,
            right: right.into(),
            mode: self.mode,
        }
    }
}

/// Comparison methods for anything that can stand left of a decider condition.
pub trait DeciOperand: Copy + Into<DeciLeft> {
    fn lt(self, right: impl Into<DeciRight>) -> DeciInput<Self> {
        self.with_mode(DeciMode::Lt).against(right)
    }

    fn gt(self, right: impl Into<DeciRight>) -> DeciInput<Self> {
        self.with_mode(DeciMode::Gt).against(right)
    }

    fn le(self, right: impl Into<DeciRight>) -> DeciInput<Self> {
        self.with_mode(DeciMode::Le).against(right)
    }

    fn ge(self, right: impl Into<DeciRight>) -> DeciInput<Self> {
        self.with_mode(DeciMode::Ge).against(right)
    }

    fn eq(self, right: impl Into<DeciRight>) -> Boolable<DeciInput<Self>> {
        let right = right.into();
        let left: DeciLeft = self.into();
        Boolable {
            truth: left.same_operand(right),
            input: self.with_mode(DeciMode::Eq).against(right),
        }
    }

    fn ne(self, right: impl Into<DeciRight>) -> Boolable<DeciInput<Self>> {
        let right = right.into();
        let left: DeciLeft = self.into();
        Boolable {
            truth: !left.same_operand(right),
            input: self.with_mode(DeciMode::Ne).against(right),
        }
    }

    /// Start a condition whose mode is chosen at runtime.
    fn with_mode(self, mode: DeciMode) -> DeciModeHolder<Self> {
        DeciModeHolder { left: self, mode }
    }
}

impl DeciOperand for Signal {}
impl DeciOperand for Any {}
impl DeciOperand for All {}
impl DeciOperand for Each {}
impl DeciOperand for WildCard {}
impl DeciOperand for DeciLeft {}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// A decider output. `O` keeps the static shape of the output signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeciOutput<O> {
    pub output: O,
    pub value: DeciOutputValue,
}

/// Anything that can be a decider output.
pub trait DeciOutputTarget: Copy + Into<DeciOutputType> {
    /// Emit `value`, or the input count when given [`INPUT`].
    fn out(self, value: impl Into<DeciOutputValue>) -> DeciOutput<Self> {
        DeciOutput {
            output: self,
            value: value.into(),
        }
    }
}

impl DeciOutputTarget for Signal {}
impl DeciOutputTarget for All {}
impl DeciOutputTarget for Each {}
impl DeciOutputTarget for DeciOutputType {}

impl WildCard {
    /// Decider output for a runtime wildcard. `Any` is rejected.
    pub fn out(
        self,
        value: impl Into<DeciOutputValue>,
    ) -> Result<DeciOutput<DeciOutputType>, AlgebraError> {
        Ok(DeciOutput {
            output: DeciOutputType::try_from(self)?,
            value: value.into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Combinator
// ---------------------------------------------------------------------------

/// The payload of a decider combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DeciComData {
    pub left: DeciLeft,
    pub right: DeciRight,
    pub mode: DeciMode,
    pub output: DeciOutputType,
    pub value: DeciOutputValue,
}

impl DeciComData {
    /// Build a payload, rejecting input/output pairs the game does not allow.
    pub fn new(
        left: DeciLeft,
        right: DeciRight,
        mode: DeciMode,
        output: DeciOutputType,
        value: DeciOutputValue,
    ) -> Result<Self, AlgebraError> {
        match (left, output) {
            (DeciLeft::Each, DeciOutputType::All) => {
                return Err(AlgebraError::EverythingOutputWithEachInput);
            }
            (l, DeciOutputType::Each) if l != DeciLeft::Each => {
                return Err(AlgebraError::EachOutputWithoutEachInput);
            }
            _ => {}
        }
        Ok(Self {
            left,
            right,
            mode,
            output,
            value,
        })
    }
}

/// A decider combinator whose output drives the networks named by `C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeciCom<C = RedGreen> {
    data: DeciComData,
    color: PhantomData<C>,
}

impl<C> DeciCom<C> {
    pub fn data(&self) -> &DeciComData {
        &self.data
    }
}

impl DeciCom {
    fn from_data(data: DeciComData) -> Self {
        Self {
            data,
            color: PhantomData,
        }
    }

    /// Build from a payload, checking the input/output pairing.
    pub fn try_from_data(data: DeciComData) -> Result<Self, AlgebraError> {
        let DeciComData {
            left,
            right,
            mode,
            output,
            value,
        } = data;
        DeciComData::new(left, right, mode, output, value).map(Self::from_data)
    }

    /// Red-only projection.
    pub fn r(self) -> DeciCom<Red> {
        DeciCom {
            data: self.data,
            color: PhantomData,
        }
    }

    /// Green-only projection.
    pub fn g(self) -> DeciCom<Green> {
        DeciCom {
            data: self.data,
            color: PhantomData,
        }
    }
}

/// Joins a condition with an output.
pub trait Then<O> {
    type Output;

    fn then(self, output: DeciOutput<O>) -> Self::Output;
}

macro_rules! then_valid {
    ($($left:ty => $($out:ty),+);* $(;)?) => {$($(
        impl Then<$out> for DeciInput<$left> {
            type Output = DeciCom;

            fn then(self, output: DeciOutput<$out>) -> DeciCom {
                DeciCom::from_data(DeciComData {
                    left: self.left.into(),
                    right: self.right,
                    mode: self.mode,
                    output: output.output.into(),
                    value: output.value,
                })
            }
        }
    )+)*};
}

macro_rules! then_checked {
    ($($left:ty => $($out:ty),+);* $(;)?) => {$($(
        impl Then<$out> for DeciInput<$left> {
            type Output = Result<DeciCom, AlgebraError>;

            fn then(self, output: DeciOutput<$out>) -> Result<DeciCom, AlgebraError> {
                DeciComData::new(
                    self.left.into(),
                    self.right,
                    self.mode,
                    output.output.into(),
                    output.value,
                )
                .map(DeciCom::from_data)
            }
        }
    )+)*};
}

then_valid! {
    Signal => Signal, All;
    Any => Signal, All;
    All => Signal, All;
    Each => Signal, Each;
}

then_checked! {
    Signal => DeciOutputType;
    Any => DeciOutputType;
    All => DeciOutputType;
    Each => DeciOutputType;
    WildCard => Signal, All, Each, DeciOutputType;
    DeciLeft => Signal, All, Each, DeciOutputType;
}

impl<L, O> Then<O> for Boolable<DeciInput<L>>
where
    DeciInput<L>: Then<O>,
{
    type Output = <DeciInput<L> as Then<O>>::Output;

    fn then(self, output: DeciOutput<O>) -> Self::Output {
        self.input.then(output)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
