/// Auxiliary two-qubit register driven by player moves.
///
/// Purely cosmetic: the simulation never reads it. It starts in the Bell
/// state (H on q0, then CNOT q0→q1) and every accepted move applies one
/// Pauli gate to q0. At exit it reports how it got there and the exact
/// measurement distribution.
///
/// Basis index is `q1 q0` read as a binary number, so label "01" means
/// q1 = 0, q0 = 1.

use std::fmt::Write as _;
use std::ops::{Add, Mul, Neg};

use crate::domain::entity::Dir;

/// Receives each accepted player move.
pub trait MoveObserver {
    fn on_move(&mut self, dir: Dir);
    fn summary(&self) -> String;
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
struct Amp {
    re: f64,
    im: f64,
}

impl Amp {
    const ZERO: Amp = Amp { re: 0.0, im: 0.0 };
    const I: Amp = Amp { re: 0.0, im: 1.0 };

    fn real(re: f64) -> Self {
        Amp { re, im: 0.0 }
    }

    fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }
}

impl Add for Amp {
    type Output = Amp;
    fn add(self, o: Amp) -> Amp {
        Amp { re: self.re + o.re, im: self.im + o.im }
    }
}

impl Mul for Amp {
    type Output = Amp;
    fn mul(self, o: Amp) -> Amp {
        Amp {
            re: self.re * o.re - self.im * o.im,
            im: self.re * o.im + self.im * o.re,
        }
    }
}

impl Neg for Amp {
    type Output = Amp;
    fn neg(self) -> Amp {
        Amp { re: -self.re, im: -self.im }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Gate {
    X,
    Y,
    Z,
}

impl Gate {
    const ALL: [Gate; 3] = [Gate::X, Gate::Y, Gate::Z];

    pub fn for_dir(dir: Dir) -> Gate {
        match dir {
            Dir::Left | Dir::Down => Gate::X,
            Dir::Right => Gate::Y,
            Dir::Up => Gate::Z,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Gate::X => "X",
            Gate::Y => "Y",
            Gate::Z => "Z",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

pub const BASIS_LABELS: [&str; 4] = ["00", "01", "10", "11"];

const HISTOGRAM_WIDTH: usize = 40;

pub struct QuantumRegister {
    amps: [Amp; 4],
    gate_counts: [usize; 3],
    dir_counts: [usize; 4],
}

impl QuantumRegister {
    /// (|00⟩ + |11⟩) / √2
    pub fn bell() -> Self {
        let h = Amp::real(std::f64::consts::FRAC_1_SQRT_2);
        QuantumRegister {
            amps: [h, Amp::ZERO, Amp::ZERO, h],
            gate_counts: [0; 3],
            dir_counts: [0; 4],
        }
    }

    /// Apply a single-qubit Pauli gate to q0.
    pub fn apply(&mut self, gate: Gate) {
        // Pairs of basis states differing only in q0: (q0 = 0, q0 = 1).
        for (lo, hi) in [(0, 1), (2, 3)] {
            let (a0, a1) = (self.amps[lo], self.amps[hi]);
            let (n0, n1) = match gate {
                Gate::X => (a1, a0),
                Gate::Y => (-(Amp::I * a1), Amp::I * a0),
                Gate::Z => (a0, -a1),
            };
            self.amps[lo] = n0;
            self.amps[hi] = n1;
        }
        self.gate_counts[gate.index()] += 1;
    }

    /// Measurement probabilities in `BASIS_LABELS` order.
    pub fn probabilities(&self) -> [f64; 4] {
        self.amps.map(Amp::norm_sqr)
    }

    pub fn gate_count(&self) -> usize {
        self.gate_counts.iter().sum()
    }

    fn dir_slot(dir: Dir) -> usize {
        match dir {
            Dir::Left => 0,
            Dir::Right => 1,
            Dir::Up => 2,
            Dir::Down => 3,
        }
    }
}

impl MoveObserver for QuantumRegister {
    fn on_move(&mut self, dir: Dir) {
        self.dir_counts[Self::dir_slot(dir)] += 1;
        self.apply(Gate::for_dir(dir));
    }

    fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Register: {} gates applied", self.gate_count());

        let gates: Vec<String> = Gate::ALL
            .iter()
            .map(|g| format!("{}={}", g.name(), self.gate_counts[g.index()]))
            .collect();
        let _ = writeln!(out, "  gates: {}", gates.join(" "));

        let dirs: Vec<String> = Dir::INPUT_ORDER
            .iter()
            .map(|d| format!("{}={}", d.name(), self.dir_counts[Self::dir_slot(*d)]))
            .collect();
        let _ = writeln!(out, "  moves: {}", dirs.join(" "));

        for (label, p) in BASIS_LABELS.iter().zip(self.probabilities()) {
            let bar = "#".repeat((p * HISTOGRAM_WIDTH as f64).round() as usize);
            let _ = writeln!(out, "  {label} |{bar:<w$}| {:5.1}%", p * 100.0, w = HISTOGRAM_WIDTH);
        }
        out
    }
}
