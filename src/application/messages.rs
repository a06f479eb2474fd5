//! User-facing notification texts

use crate::application::errors::CartError;

pub const PRODUCT_ADDED: &str = "Produto adicionado ao carrinho";
pub const OUT_OF_STOCK: &str = "Quantidade solicitada fora de estoque";
pub const ADD_FAILED: &str = "Erro na adição do produto";
pub const REMOVE_FAILED: &str = "Erro na remoção do produto";
pub const UPDATE_FAILED: &str = "Erro na alteração de quantidade do produto";

/// Mutating cart operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl CartOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartOperation::Add => "add",
            CartOperation::Remove => "remove",
            CartOperation::UpdateAmount => "update_amount",
        }
    }

    /// Generic failure text for this operation
    pub fn failure_message(&self) -> &'static str {
        match self {
            CartOperation::Add => ADD_FAILED,
            CartOperation::Remove => REMOVE_FAILED,
            CartOperation::UpdateAmount => UPDATE_FAILED,
        }
    }

    /// Text shown on success, if the operation announces itself
    pub fn success_message(&self) -> Option<&'static str> {
        match self {
            CartOperation::Add => Some(PRODUCT_ADDED),
            CartOperation::Remove | CartOperation::UpdateAmount => None,
        }
    }
}

impl std::fmt::Display for CartOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notification text for a failed operation; `None` for silent guards
pub fn failure_message(operation: CartOperation, error: &CartError) -> Option<&'static str> {
    if error.is_silent() {
        return None;
    }
    if error.is_out_of_stock() {
        return Some(OUT_OF_STOCK);
    }
    Some(operation.failure_message())
}
