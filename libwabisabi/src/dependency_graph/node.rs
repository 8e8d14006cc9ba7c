use crate::CREDENTIAL_NUMBER;

pub type NodeId = usize;

/// The two independent value dimensions every request must balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CredentialType {
    Amount,
    Vsize,
}

impl CredentialType {
    pub const COUNT: usize = 2;
    pub const ALL: [CredentialType; CredentialType::COUNT] =
        [CredentialType::Amount, CredentialType::Vsize];

    pub fn index(self) -> usize {
        match self {
            CredentialType::Amount => 0,
            CredentialType::Vsize => 1,
        }
    }
}

/// One value per credential type, as carried by inputs and outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValueVector {
    pub amount: u64,
    pub vsize: u64,
}

impl ValueVector {
    pub fn new(amount: u64, vsize: u64) -> Self {
        ValueVector { amount, vsize }
    }

    pub fn value(self, credential_type: CredentialType) -> u64 {
        match credential_type {
            CredentialType::Amount => self.amount,
            CredentialType::Vsize => self.vsize,
        }
    }
}

/// The three node roles differ only in their fixed degree bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Input,
    Output,
    Reissuance,
}

/// A vertex of the planning graph: one registration request. Input nodes
/// start with the input's value as positive balance, Output nodes with the
/// output's value negated, Reissuance nodes at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestNode {
    pub id: NodeId,
    pub kind: NodeKind,
    initial_balance: [i64; CredentialType::COUNT],
}

impl RequestNode {
    pub fn input(id: NodeId, values: ValueVector) -> Self {
        RequestNode {
            id,
            kind: NodeKind::Input,
            initial_balance: [values.amount as i64, values.vsize as i64],
        }
    }

    pub fn output(id: NodeId, values: ValueVector) -> Self {
        RequestNode {
            id,
            kind: NodeKind::Output,
            initial_balance: [-(values.amount as i64), -(values.vsize as i64)],
        }
    }

    pub fn reissuance(id: NodeId) -> Self {
        RequestNode { id, kind: NodeKind::Reissuance, initial_balance: [0; CredentialType::COUNT] }
    }

    pub fn initial_balance(&self, credential_type: CredentialType) -> i64 {
        self.initial_balance[credential_type.index()]
    }

    /// In-edges are credentials presented at this node's request; inputs
    /// present nothing.
    pub fn max_in_degree(&self) -> usize {
        match self.kind {
            NodeKind::Input => 0,
            _ => CREDENTIAL_NUMBER,
        }
    }

    /// Out-edges are this node's issued credentials spent elsewhere;
    /// outputs spend nothing.
    pub fn max_out_degree(&self) -> usize {
        match self.kind {
            NodeKind::Output => 0,
            _ => CREDENTIAL_NUMBER,
        }
    }

    /// Extra capacity reserved for the zero-credential filling pass, so
    /// it can always terminate no matter how the value edges came out.
    pub fn max_zero_only_out_degree(&self) -> usize {
        match self.kind {
            NodeKind::Output => 0,
            _ => CREDENTIAL_NUMBER * (CREDENTIAL_NUMBER - 1),
        }
    }
}
