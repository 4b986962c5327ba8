//! Arithmetic combinator algebra.
//!
//! Arithmetic inputs are written with ordinary operators, with `^` meaning
//! XOR as in the game. Power is [`AriOperand::pow`]. The input is paired with
//! an output through [`On`]:
//!
//! ```
//! use combinet_logic::{Each, On};
//!
//! let scale = (Each * 10).on(Each);
//! assert_eq!(scale.data().right, combinet_logic::AriRight::Constant(10));
//! ```
//!
//! Only an `each` input can produce an `each` output:
//!
//! ```compile_fail
//! use combinet_logic::Signal;
//! use combinet_logic::{Each, On};
//!
//! fn bad(coal: Signal) {
//!     let _ = (coal * 10).on(Each);
//! }
//! ```

use std::marker::PhantomData;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Rem, Shl, Shr, Sub};

use crate::signal::Signal;
use serde::{Deserialize, Serialize};

use crate::ModeDescription;
use crate::color::{Green, Red, RedGreen};
use crate::error::AlgebraError;
use crate::wildcard::{Each, WildCard};

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AriMode {
    Mul,
    Div,
    Add,
    Sub,
    Rem,
    Pow,
    Shl,
    Shr,
    And,
    Or,
    Xor,
}

static ARI_MODES: [ModeDescription; 11] = [
    ModeDescription { name: "multiplication", code_syntax: "*", game_syntax: "*", index: 0 },
    ModeDescription { name: "division", code_syntax: "/", game_syntax: "/", index: 1 },
    ModeDescription { name: "addition", code_syntax: "+", game_syntax: "+", index: 2 },
    ModeDescription { name: "subtraction", code_syntax: "-", game_syntax: "-", index: 3 },
    ModeDescription { name: "modulo", code_syntax: "%", game_syntax: "%", index: 4 },
    ModeDescription { name: "power", code_syntax: "pow", game_syntax: "^", index: 5 },
    ModeDescription { name: "shift_left", code_syntax: "<<", game_syntax: "<<", index: 6 },
    ModeDescription { name: "shift_right", code_syntax: ">>", game_syntax: ">>", index: 7 },
    ModeDescription { name: "bit_and", code_syntax: "&", game_syntax: "AND", index: 8 },
    ModeDescription { name: "bit_or", code_syntax: "|", game_syntax: "OR", index: 9 },
    ModeDescription { name: "bit_xor", code_syntax: "^", game_syntax: "XOR", index: 10 },
];

impl AriMode {
    pub const ALL: [AriMode; 11] = [
        AriMode::Mul,
        AriMode::Div,
        AriMode::Add,
        AriMode::Sub,
        AriMode::Rem,
        AriMode::Pow,
        AriMode::Shl,
        AriMode::Shr,
        AriMode::And,
        AriMode::Or,
        AriMode::Xor,
    ];

    pub fn description(self) -> &'static ModeDescription {
        &ARI_MODES[self as usize]
    }

    pub fn game_syntax(self) -> &'static str {
        self.description().game_syntax
    }

    pub fn from_game_syntax(syntax: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.game_syntax() == syntax)
    }

    /// Apply the operation with the game's 32-bit semantics.
    ///
    /// Division and modulo by zero give 0, as does `i32::MIN` divided by -1.
    /// Shift counts are masked to 5 bits and right shifts are arithmetic.
    /// Everything else wraps.
    pub fn apply(self, left: i32, right: i32) -> i32 {
        match self {
            AriMode::Mul => left.wrapping_mul(right),
            AriMode::Div => left.checked_div(right).unwrap_or(0),
            AriMode::Add => left.wrapping_add(right),
            AriMode::Sub => left.wrapping_sub(right),
            AriMode::Rem => left.checked_rem(right).unwrap_or(0),
            AriMode::Pow => pow(left, right),
            AriMode::Shl => left.wrapping_shl(right as u32),
            AriMode::Shr => left.wrapping_shr(right as u32),
            AriMode::And => left & right,
            AriMode::Or => left | right,
            AriMode::Xor => left ^ right,
        }
    }
}

fn pow(base: i32, exp: i32) -> i32 {
    match (base, exp) {
        (_, 0) => 1,
        (0, _) => 0,
        (1, _) => 1,
        (-1, e) => {
            if e & 1 == 1 {
                -1
            } else {
                1
            }
        }
        (_, e) if e < 0 => 0,
        (b, e) => b.wrapping_pow(e as u32),
    }
}

// ---------------------------------------------------------------------------
// Operands
// ---------------------------------------------------------------------------

/// Left side of an arithmetic expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AriLeft {
    Constant(i32),
    Each,
    Signal(Signal),
}

/// Right side of an arithmetic expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AriRight {
    Constant(i32),
    Signal(Signal),
}

/// Arithmetic output signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AriOutput {
    Each,
    Signal(Signal),
}

impl From<i32> for AriLeft {
    fn from(v: i32) -> Self {
        AriLeft::Constant(v)
    }
}

impl From<Each> for AriLeft {
    fn from(_: Each) -> Self {
        AriLeft::Each
    }
}

impl From<Signal> for AriLeft {
    fn from(s: Signal) -> Self {
        AriLeft::Signal(s)
    }
}

impl TryFrom<WildCard> for AriLeft {
    type Error = AlgebraError;

    fn try_from(w: WildCard) -> Result<Self, AlgebraError> {
        match w {
            WildCard::Each => Ok(AriLeft::Each),
            _ => Err(AlgebraError::WildcardNotAllowed {
                wildcard: w,
                position: "an arithmetic input",
            }),
        }
    }
}

impl From<i32> for AriRight {
    fn from(v: i32) -> Self {
        AriRight::Constant(v)
    }
}

impl From<Signal> for AriRight {
    fn from(s: Signal) -> Self {
        AriRight::Signal(s)
    }
}

impl From<Each> for AriOutput {
    fn from(_: Each) -> Self {
        AriOutput::Each
    }
}

impl From<Signal> for AriOutput {
    fn from(s: Signal) -> Self {
        AriOutput::Signal(s)
    }
}

impl TryFrom<WildCard> for AriOutput {
    type Error = AlgebraError;

    fn try_from(w: WildCard) -> Result<Self, AlgebraError> {
        match w {
            WildCard::Each => Ok(AriOutput::Each),
            _ => Err(AlgebraError::WildcardNotAllowed {
                wildcard: w,
                position: "an arithmetic output",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// An arithmetic expression. `L` keeps the static shape of the left operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AriInput<L> {
    pub left: L,
    pub right: AriRight,
    pub mode: AriMode,
}

impl<L: Into<AriLeft>> AriInput<L> {
    /// Forget the static shape of the left operand.
    pub fn generic(self) -> AriInput<AriLeft> {
        AriInput {
            left: self.left.into(),
            right: self.right,
            mode: self.mode,
        }
    }
}

/// Holds a left operand and a runtime-chosen operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AriOpHolder<L> {
    left: L,
    mode: AriMode,
}

impl<L> AriOpHolder<L> {
    pub fn against(self, right: impl Into<AriRight>) -> AriInput<L> {
        AriInput {
            left: self.left,
            right: right.into(),
            mode: self.mode,
        }
    }
}

/// Methods shared by every arithmetic left operand.
///
/// `i32` has an inherent `pow`, so for constant bases call
/// `AriOperand::pow(2, signal)`.
pub trait AriOperand: Copy + Into<AriLeft> {
    fn pow(self, right: impl Into<AriRight>) -> AriInput<Self> {
        self.with_op(AriMode::Pow).against(right)
    }

    /// Start an expression whose operation is chosen at runtime.
    fn with_op(self, mode: AriMode) -> AriOpHolder<Self> {
        AriOpHolder { left: self, mode }
    }
}

impl AriOperand for i32 {}
impl AriOperand for Each {}
impl AriOperand for Signal {}
impl AriOperand for AriLeft {}

macro_rules! ari_operators {
    ($($op:ident :: $method:ident => $mode:ident),* $(,)?) => {$(
        impl<R: Into<AriRight>> $op<R> for Signal {
            type Output = AriInput<Signal>;

            fn $method(self, right: R) -> AriInput<Signal> {
                self.with_op(AriMode::$mode).against(right)
            }
        }

        impl<R: Into<AriRight>> $op<R> for Each {
            type Output = AriInput<Each>;

            fn $method(self, right: R) -> AriInput<Each> {
                self.with_op(AriMode::$mode).against(right)
            }
        }

        impl<R: Into<AriRight>> $op<R> for AriLeft {
            type Output = AriInput<AriLeft>;

            fn $method(self, right: R) -> AriInput<AriLeft> {
                self.with_op(AriMode::$mode).against(right)
            }
        }

        impl<R: Into<AriRight>> $op<R> for WildCard {
            type Output = Result<AriInput<AriLeft>, AlgebraError>;

            fn $method(self, right: R) -> Self::Output {
                Ok(AriLeft::try_from(self)?.with_op(AriMode::$mode).against(right))
            }
        }

        impl $op<Signal> for i32 {
            type Output = AriInput<i32>;

            fn $method(self, right: Signal) -> AriInput<i32> {
                self.with_op(AriMode::$mode).against(right)
            }
        }

        impl $op<AriRight> for i32 {
            type Output = AriInput<i32>;

            fn $method(self, right: AriRight) -> AriInput<i32> {
                self.with_op(AriMode::$mode).against(right)
            }
        }
    )*};
}

ari_operators! {
    Mul::mul => Mul,
    Div::div => Div,
    Add::add => Add,
    Sub::sub => Sub,
    Rem::rem => Rem,
    Shl::shl => Shl,
    Shr::shr => Shr,
    BitAnd::bitand => And,
    BitOr::bitor => Or,
    BitXor::bitxor => Xor,
}

// ---------------------------------------------------------------------------
// Combinator
// ---------------------------------------------------------------------------

/// The payload of an arithmetic combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AriComData {
    pub left: AriLeft,
    pub right: AriRight,
    pub mode: AriMode,
    pub output: AriOutput,
}

impl AriComData {
    /// Build a payload. An `each` output needs an `each` left operand.
    pub fn new(
        left: AriLeft,
        right: AriRight,
        mode: AriMode,
        output: AriOutput,
    ) -> Result<Self, AlgebraError> {
        if output == AriOutput::Each && left != AriLeft::Each {
            return Err(AlgebraError::EachOutputWithoutEachInput);
        }
        Ok(Self {
            left,
            right,
            mode,
            output,
        })
    }
}

/// An arithmetic combinator whose output drives the networks named by `C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AriCom<C = RedGreen> {
    data: AriComData,
    color: PhantomData<C>,
}

impl<C> AriCom<C> {
    pub fn data(&self) -> &AriComData {
        &self.data
    }
}

impl AriCom {
    fn from_data(data: AriComData) -> Self {
        Self {
            data,
            color: PhantomData,
        }
    }

    pub fn try_from_data(data: AriComData) -> Result<Self, AlgebraError> {
        AriComData::new(data.left, data.right, data.mode, data.output).map(Self::from_data)
    }

    pub fn r(self) -> AriCom<Red> {
        AriCom {
            data: self.data,
            color: PhantomData,
        }
    }

    pub fn g(self) -> AriCom<Green> {
        AriCom {
            data: self.data,
            color: PhantomData,
        }
    }
}

/// Pairs an arithmetic expression with its output signal.
pub trait On<O> {
    type Output;

    fn on(self, output: O) -> Self::Output;
}

macro_rules! on_valid {
    ($($left:ty => $($out:ty),+);* $(;)?) => {$($(
        impl On<$out> for AriInput<$left> {
            type Output = AriCom;

            fn on(self, output: $out) -> AriCom {
                AriCom::from_data(AriComData {
                    left: self.left.into(),
                    right: self.right,
                    mode: self.mode,
                    output: output.into(),
                })
            }
        }
    )+)*};
}

macro_rules! on_checked {
    ($($left:ty => $($out:ty),+);* $(;)?) => {$($(
        impl On<$out> for AriInput<$left> {
            type Output = Result<AriCom, AlgebraError>;

            fn on(self, output: $out) -> Result<AriCom, AlgebraError> {
                AriComData::new(self.left.into(), self.right, self.mode, output.into())
                    .map(AriCom::from_data)
            }
        }
    )+)*};
}

on_valid! {
    Each => Each, Signal, AriOutput;
    Signal => Signal;
    i32 => Signal;
}

on_checked! {
    Signal => AriOutput;
    i32 => AriOutput;
    AriLeft => Each, Signal, AriOutput;
}

impl<L: Into<AriLeft>> On<WildCard> for AriInput<L> {
    type Output = Result<AriCom, AlgebraError>;

    fn on(self, output: WildCard) -> Result<AriCom, AlgebraError> {
        let output = AriOutput::try_from(output)?;
        AriComData::new(self.left.into(), self.right, self.mode, output).map(AriCom::from_data)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn mode_game_strings() {
        let strings: Vec<_> = AriMode::ALL.iter().map(|m| m.game_syntax()).collect();
        assert_eq!(
            strings,
            vec!["*", "/", "+", "-", "%", "^", "<<", ">>", "AND", "OR", "XOR"]
        );
        assert_eq!(AriMode::from_game_syntax("XOR"), Some(AriMode::Xor));
    }

    #[test]
    fn division_edge_cases() {
        assert_eq!(AriMode::Div.apply(7, 0), 0);
        assert_eq!(AriMode::Rem.apply(7, 0), 0);
        assert_eq!(AriMode::Div.apply(i32::MIN, -1), 0);
        assert_eq!(AriMode::Rem.apply(i32::MIN, -1), 0);
        assert_eq!(AriMode::Div.apply(-7, 2), -3);
        assert_eq!(AriMode::Rem.apply(-7, 2), -1);
    }

    #[test]
    fn power_edge_cases() {
        assert_eq!(AriMode::Pow.apply(5, 0), 1);
        assert_eq!(AriMode::Pow.apply(0, 0), 1);
        assert_eq!(AriMode::Pow.apply(0, 3), 0);
        assert_eq!(AriMode::Pow.apply(1, -8), 1);
        assert_eq!(AriMode::Pow.apply(-1, 3), -1);
        assert_eq!(AriMode::Pow.apply(-1, -4), 1);
        assert_eq!(AriMode::Pow.apply(3, -1), 0);
        assert_eq!(AriMode::Pow.apply(2, 10), 1024);
        assert_eq!(AriMode::Pow.apply(2, 31), i32::MIN);
        assert_eq!(AriMode::Pow.apply(2, 32), 0);
    }

    #[test]
    fn shifts_and_wrapping() {
        assert_eq!(AriMode::Shl.apply(1, 33), 2);
        assert_eq!(AriMode::Shr.apply(-8, 1), -4);
        assert_eq!(AriMode::Shl.apply(1, 31), i32::MIN);
        assert_eq!(AriMode::Add.apply(i32::MAX, 1), i32::MIN);
        assert_eq!(AriMode::Sub.apply(i32::MIN, 1), i32::MAX);
        assert_eq!(AriMode::Mul.apply(65536, 65536), 0);
    }

    #[test]
    fn bitwise_modes() {
        assert_eq!(AriMode::And.apply(0b1100, 0b1010), 0b1000);
        assert_eq!(AriMode::Or.apply(0b1100, 0b1010), 0b1110);
        assert_eq!(AriMode::Xor.apply(0b1100, 0b1010), 0b0110);
    }

    #[test]
    fn operators_build_inputs() {
        let input = coal() * 10;
        assert_eq!(input.left, coal());
        assert_eq!(input.right, AriRight::Constant(10));
        assert_eq!(input.mode, AriMode::Mul);

        assert_eq!((Each ^ signal_a()).mode, AriMode::Xor);
        assert_eq!((Each & 1).mode, AriMode::And);
        assert_eq!((coal() | 1).mode, AriMode::Or);
        assert_eq!((coal() << 2).mode, AriMode::Shl);
        assert_eq!((coal() >> 2).mode, AriMode::Shr);
        assert_eq!((coal() % 2).mode, AriMode::Rem);

        let rev = 100 - coal();
        assert_eq!(rev.left, 100);
        assert_eq!(rev.right, AriRight::Signal(coal()));
        assert_eq!(rev.mode, AriMode::Sub);
    }

    #[test]
    fn every_operator_on_every_left_operand() {
        let forms: [(AriMode, fn(Signal) -> AriInput<Signal>); 10] = [
            (AriMode::Mul, |s| s * 3),
            (AriMode::Div, |s| s / 3),
            (AriMode::Add, |s| s + 3),
            (AriMode::Sub, |s| s - 3),
            (AriMode::Rem, |s| s % 3),
            (AriMode::Shl, |s| s << 3),
            (AriMode::Shr, |s| s >> 3),
            (AriMode::And, |s| s & 3),
            (AriMode::Or, |s| s | 3),
            (AriMode::Xor, |s| s ^ 3),
        ];
        for (mode, build) in forms {
            let input = build(coal());
            assert_eq!((input.left, input.right, input.mode), (coal(), AriRight::Constant(3), mode));
        }

        let each: [(AriMode, AriInput<Each>); 10] = [
            (AriMode::Mul, Each * coal()),
            (AriMode::Div, Each / coal()),
            (AriMode::Add, Each + coal()),
            (AriMode::Sub, Each - coal()),
            (AriMode::Rem, Each % coal()),
            (AriMode::Shl, Each << coal()),
            (AriMode::Shr, Each >> coal()),
            (AriMode::And, Each & coal()),
            (AriMode::Or, Each | coal()),
            (AriMode::Xor, Each ^ coal()),
        ];
        for (mode, input) in each {
            assert_eq!(input.mode, mode);
            assert_eq!(input.right, AriRight::Signal(coal()));
        }

        let generic: [(AriMode, AriInput<AriLeft>); 10] = [
            (AriMode::Mul, AriLeft::Each * 1),
            (AriMode::Div, AriLeft::Each / 1),
            (AriMode::Add, AriLeft::Each + 1),
            (AriMode::Sub, AriLeft::Each - 1),
            (AriMode::Rem, AriLeft::Each % 1),
            (AriMode::Shl, AriLeft::Each << 1),
            (AriMode::Shr, AriLeft::Each >> 1),
            (AriMode::And, AriLeft::Each & 1),
            (AriMode::Or, AriLeft::Each | 1),
            (AriMode::Xor, AriLeft::Each ^ 1),
        ];
        for (mode, input) in generic {
            assert_eq!((input.left, input.mode), (AriLeft::Each, mode));
        }

        let constant: [(AriMode, AriInput<i32>); 10] = [
            (AriMode::Mul, 7 * coal()),
            (AriMode::Div, 7 / coal()),
            (AriMode::Add, 7 + coal()),
            (AriMode::Sub, 7 - coal()),
            (AriMode::Rem, 7 % coal()),
            (AriMode::Shl, 7 << coal()),
            (AriMode::Shr, 7 >> coal()),
            (AriMode::And, 7 & coal()),
            (AriMode::Or, 7 | coal()),
            (AriMode::Xor, 7 ^ coal()),
        ];
        for (mode, input) in constant {
            assert_eq!((input.left, input.right, input.mode), (7, AriRight::Signal(coal()), mode));
        }

        let right = 7 * AriRight::Signal(signal_a());
        assert_eq!((right.left, right.right), (7, AriRight::Signal(signal_a())));
        assert_eq!((signal_a() - signal_b()).right, AriRight::Signal(signal_b()));
    }

    #[test]
    fn pow_and_runtime_op() {
        assert_eq!(coal().pow(2).mode, AriMode::Pow);
        assert_eq!(AriOperand::pow(2, coal()).left, 2);
        for mode in AriMode::ALL {
            let input = Each.with_op(mode).against(signal_b());
            assert_eq!(input.mode, mode);
            assert_eq!(input.right, AriRight::Signal(signal_b()));
        }
    }

    #[test]
    fn static_pairs() {
        let each = (Each * 10).on(Each);
        assert_eq!(each.data().output, AriOutput::Each);
        let sum = (Each + 0).on(signal_a());
        assert_eq!(sum.data().output, AriOutput::Signal(signal_a()));
        let counter = (signal_x() + 1).on(signal_x());
        assert_eq!(counter.data().left, AriLeft::Signal(signal_x()));
        let constant = (5 * coal()).on(signal_a());
        assert_eq!(constant.data().left, AriLeft::Constant(5));
    }

    #[test]
    fn checked_pairs() {
        assert!((coal() * 2).on(AriOutput::Each).is_err());
        assert!((coal() * 2).on(AriOutput::Signal(signal_a())).is_ok());
        assert!((AriLeft::Each * 2).on(Each).is_ok());
        assert!((AriLeft::Constant(3) * 2).on(Each).is_err());
        assert!((Each * 2).on(WildCard::Any).is_err());
        assert!((Each * 2).on(WildCard::Each).is_ok());
    }

    #[test]
    fn wildcard_left_operand() {
        let input = (WildCard::Each + 1).unwrap();
        assert_eq!(input.left, AriLeft::Each);
        assert!((WildCard::All + 1).is_err());
        assert!((WildCard::Any * signal_a()).is_err());
    }

    #[test]
    fn projections_share_payload() {
        let com = (Each * 10).on(Each);
        assert_eq!(com.r().data(), com.data());
        assert_eq!(com.g().data(), com.data());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_mode() -> impl Strategy<Value = AriMode> {
            (0..AriMode::ALL.len()).prop_map(|i| AriMode::ALL[i])
        }

        proptest! {
            /// `apply` is total: no operand pair panics, and the wrapping
            /// operators agree with two's-complement arithmetic.
            #[test]
            fn apply_is_total(mode in arb_mode(), left in any::<i32>(), right in any::<i32>()) {
                let value = mode.apply(left, right);
                match mode {
                    AriMode::Add => prop_assert_eq!(value, left.wrapping_add(right)),
                    AriMode::Sub => prop_assert_eq!(value, left.wrapping_sub(right)),
                    AriMode::Mul => prop_assert_eq!(value, left.wrapping_mul(right)),
                    AriMode::Shl => prop_assert_eq!(value, left.wrapping_shl((right & 31) as u32)),
                    AriMode::Shr => prop_assert_eq!(value, left >> (right & 31)),
                    _ => {}
                }
            }

            /// Division and modulo satisfy `l == (l / r) * r + l % r` wherever
            /// the quotient is defined.
            #[test]
            fn division_identity(left in any::<i32>(), right in any::<i32>()) {
                prop_assume!(right != 0 && !(left == i32::MIN && right == -1));
                let q = AriMode::Div.apply(left, right);
                let r = AriMode::Rem.apply(left, right);
                prop_assert_eq!(q.wrapping_mul(right).wrapping_add(r), left);
                prop_assert!(r == 0 || r.signum() == left.signum());
            }

            /// The runtime-chosen operation builds the same input as the
            /// operator that spells it.
            #[test]
            fn runtime_op_matches_mode(mode in arb_mode(), right in any::<i32>()) {
                let input = Each.with_op(mode).against(right);
                prop_assert_eq!(input.mode, mode);
                prop_assert_eq!(input.right, AriRight::Constant(right));
                prop_assert_eq!(AriMode::from_game_syntax(mode.game_syntax()), Some(mode));
            }
        }
    }
}
