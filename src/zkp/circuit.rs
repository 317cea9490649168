//! Constraint-recording circuit builder
//!
//! [`CircuitBuilder`] is the provable-path [`Compiler`]: every element is a
//! [`Wire`], every operation appends a [`Gate`], and the assignment of every
//! wire is tracked alongside so that the builder doubles as witness generator.
//! [`CircuitBuilder::build`] splits the result into a [`Circuit`] (the gates)
//! and a [`Witness`] (the assignment), and [`Circuit::check`] re-evaluates every
//! gate against a witness.

use tracing::debug;

use crate::errors::ZkpError;
use crate::zkp::compiler::Compiler;
use crate::zkp::poseidon2_hash::poseidon2_hash_fields;
use crate::zkp::types::{Digest, Val, DIGEST_WIDTH};
use crate::Result;

/// A circuit variable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Wire(usize);

impl Wire {
    /// Position of the wire in the witness
    pub fn index(self) -> usize { self.0 }
}

/// A single constraint of the circuit
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gate {
    /// `wire` must equal `value`
    Constant {
        /// Constrained wire
        wire: Wire,
        /// Public value
        value: Val,
    },
    /// `wire` is a free private input
    Witness {
        /// Unconstrained wire
        wire: Wire,
    },
    /// `outputs` must equal `poseidon2(domain || inputs)`
    Hash {
        /// Domain separation elements (constants of the gate)
        domain: Vec<Val>,
        /// Hashed wires
        inputs: Vec<Wire>,
        /// Digest wires
        outputs: [Wire; DIGEST_WIDTH],
    },
    /// `left` must equal `right`
    AssertEq {
        /// Left-hand wire
        left: Wire,
        /// Right-hand wire
        right: Wire,
    },
}

/// Assignment of a value to every wire of a circuit
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Witness(Vec<Val>);

impl Witness {
    /// Number of assigned wires
    pub fn len(&self) -> usize { self.0.len() }

    /// Whether no wire is assigned
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Value assigned to `wire`, if any
    pub fn get(&self, wire: Wire) -> Option<Val> { self.0.get(wire.0).copied() }

    /// Overwrites the value assigned to `wire`
    ///
    /// Returns `false` if the wire is not part of the witness.
    pub fn set(&mut self, wire: Wire, value: Val) -> bool {
        match self.0.get_mut(wire.0) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Reads the values of a digest of wires
    ///
    /// # Errors
    /// * `ZkpError::WitnessLengthMismatch` - If a wire is not assigned
    pub fn read_digest(&self, digest: &Digest<Wire>) -> Result<Digest> {
        let mut values = [Val::default(); DIGEST_WIDTH];
        for (slot, wire) in values.iter_mut().zip(digest.iter()) {
            *slot = self.value(*wire)?;
        }
        Ok(Digest(values))
    }

    fn value(&self, wire: Wire) -> Result<Val> {
        self.get(wire).ok_or_else(|| {
            ZkpError::WitnessLengthMismatch { expected: wire.0 + 1, actual: self.0.len() }.into()
        })
    }
}

/// Builder that records gates and generates the witness as it goes
///
/// # Panics
/// The [`Compiler`] methods that read wires ([`Compiler::hash`] and
/// [`Compiler::assert_digest_eq`]) panic if given a [`Wire`] this builder
/// did not allocate.
#[derive(Clone, Debug, Default)]
pub struct CircuitBuilder {
    gates: Vec<Gate>,
    values: Vec<Val>,
    public_outputs: Vec<Digest<Wire>>,
}

impl CircuitBuilder {
    /// Creates an empty builder
    pub fn new() -> Self { Self::default() }

    /// Number of gates recorded so far
    pub fn num_gates(&self) -> usize { self.gates.len() }

    /// Number of wires allocated so far
    pub fn num_wires(&self) -> usize { self.values.len() }

    /// Current assignment of `wire`
    pub fn value(&self, wire: Wire) -> Option<Val> { self.values.get(wire.0).copied() }

    /// Current assignment of a digest of wires
    pub fn digest_value(&self, digest: &Digest<Wire>) -> Option<Digest> {
        let mut values = [Val::default(); DIGEST_WIDTH];
        for (slot, wire) in values.iter_mut().zip(digest.iter()) {
            *slot = self.value(*wire)?;
        }
        Some(Digest(values))
    }

    /// Marks a digest as a public output of the circuit
    pub fn register_public(&mut self, digest: Digest<Wire>) { self.public_outputs.push(digest); }

    /// Finishes the circuit, separating constraints from their assignment
    pub fn build(self) -> (Circuit, Witness) {
        debug!(
            gates = self.gates.len(),
            wires = self.values.len(),
            public_outputs = self.public_outputs.len(),
            "built circuit"
        );
        let circuit = Circuit {
            gates: self.gates,
            num_wires: self.values.len(),
            public_outputs: self.public_outputs,
        };
        (circuit, Witness(self.values))
    }

    fn alloc(&mut self, value: Val) -> Wire {
        self.values.push(value);
        Wire(self.values.len() - 1)
    }

    /// # Panics
    /// If `wire` was not allocated by this builder
    fn assigned(&self, wire: Wire) -> Val {
        match self.values.get(wire.0) {
            Some(value) => *value,
            None => panic!("wire {} not allocated by this builder", wire.0),
        }
    }
}

impl Compiler for CircuitBuilder {
    type Elem = Wire;

    fn constant(&mut self, value: Val) -> Wire {
        let wire = self.alloc(value);
        self.gates.push(Gate::Constant { wire, value });
        wire
    }

    fn witness(&mut self, value: Val) -> Wire {
        let wire = self.alloc(value);
        self.gates.push(Gate::Witness { wire });
        wire
    }

    fn hash(&mut self, domain: &[Val], inputs: &[Wire]) -> Digest<Wire> {
        let input_values: Vec<Val> = inputs.iter().map(|wire| self.assigned(*wire)).collect();
        let output_values = poseidon2_hash_fields(domain, &input_values);
        let outputs = output_values.map(|value| self.alloc(value));
        self.gates.push(Gate::Hash { domain: domain.to_vec(), inputs: inputs.to_vec(), outputs });
        Digest(outputs)
    }

    fn assert_digest_eq(&mut self, expected: &Digest<Wire>, actual: &Digest<Wire>) -> Result<()> {
        for (left, right) in expected.iter().zip(actual.iter()) {
            self.gates.push(Gate::AssertEq { left: *left, right: *right });
        }
        let expected_value = expected.map(|wire| self.assigned(*wire));
        let actual_value = actual.map(|wire| self.assigned(*wire));
        if expected_value != actual_value {
            return Err(ZkpError::CommitmentMismatch {
                expected: expected_value.to_bytes(),
                actual: actual_value.to_bytes(),
            }
            .into());
        }
        Ok(())
    }
}

/// A finished circuit: gates over a fixed number of wires
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Circuit {
    gates: Vec<Gate>,
    num_wires: usize,
    public_outputs: Vec<Digest<Wire>>,
}

impl Circuit {
    /// The recorded gates, in order
    pub fn gates(&self) -> &[Gate] { &self.gates }

    /// Number of wires
    pub fn num_wires(&self) -> usize { self.num_wires }

    /// Digests registered as public outputs
    pub fn public_outputs(&self) -> &[Digest<Wire>] { &self.public_outputs }

    /// Number of Poseidon2 hash gates
    pub fn hash_gate_count(&self) -> usize {
        self.gates.iter().filter(|gate| matches!(gate, Gate::Hash { .. })).count()
    }

    /// Checks that `witness` satisfies every gate
    ///
    /// # Errors
    /// * `ZkpError::WitnessLengthMismatch` - If the witness length differs from the wire count
    /// * `ZkpError::UnsatisfiedConstraint` - Index of the first gate the witness violates
    pub fn check(&self, witness: &Witness) -> Result<()> {
        if witness.len() != self.num_wires {
            return Err(ZkpError::WitnessLengthMismatch {
                expected: self.num_wires,
                actual: witness.len(),
            }
            .into());
        }

        for (index, gate) in self.gates.iter().enumerate() {
            let satisfied = match gate {
                Gate::Constant { wire, value } => witness.value(*wire)? == *value,
                Gate::Witness { .. } => true,
                Gate::Hash { domain, inputs, outputs } => {
                    let input_values =
                        inputs.iter().map(|wire| witness.value(*wire)).collect::<Result<Vec<_>>>()?;
                    let expected = poseidon2_hash_fields(domain, &input_values);
                    let mut matches = true;
                    for (wire, value) in outputs.iter().zip(expected.iter()) {
                        matches &= witness.value(*wire)? == *value;
                    }
                    matches
                }
                Gate::AssertEq { left, right } => witness.value(*left)? == witness.value(*right)?,
            };
            if !satisfied {
                return Err(ZkpError::UnsatisfiedConstraint { gate: index }.into());
            }
        }
        Ok(())
    }

    /// Reads the public output digests from a witness
    ///
    /// # Errors
    /// * `ZkpError::WitnessLengthMismatch` - If an output wire is not assigned
    pub fn public_values(&self, witness: &Witness) -> Result<Vec<Digest>> {
        self.public_outputs.iter().map(|digest| witness.read_digest(digest)).collect()
    }
}
