//! Programmatic raw-module construction
//!
//! The in-memory assembly API the front end targets; also what the model
//! library and the test suite use to write programs directly in IR form.
//!
//! The builder produces *raw* modules only. Canonical modules come out of
//! the canonicalizer, never out of a builder.

use super::block::{BlockId, RawBlock};
use super::function::{FunctionAttributes, RawFunction};
use super::instruction::{RawInstruction, RawOperator, RawTerminator};
use super::module::RawModule;
use super::value::{BinOp, IrType, Literal, UnaryOp, ValueDef, ValueId};
use crate::shared::models::Loc;

/// Builds one raw module from finished functions
#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    name: String,
    functions: Vec<RawFunction>,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn add_function(&mut self, function: RawFunction) -> &mut Self {
        self.functions.push(function);
        self
    }

    pub fn finish(self) -> RawModule {
        RawModule {
            name: self.name,
            functions: self.functions,
        }
    }
}

/// Builds one raw function, one block at a time
///
/// Starts positioned at the entry block (block 0). Instructions append to
/// the current block; [`FunctionBuilder::switch_to`] moves the cursor.
/// Value ids are handed out in creation order and stay sparse until the
/// canonicalizer renumbers them.
#[derive(Debug, Clone)]
pub struct FunctionBuilder {
    symbol: String,
    return_type: IrType,
    blocks: Vec<RawBlock>,
    attributes: FunctionAttributes,
    current: usize,
    next_value: u32,
    loc: Option<Loc>,
}

impl FunctionBuilder {
    pub fn new(symbol: impl Into<String>, return_type: IrType) -> Self {
        Self {
            symbol: symbol.into(),
            return_type,
            blocks: vec![RawBlock::new()],
            attributes: FunctionAttributes::default(),
            current: 0,
            next_value: 0,
            loc: None,
        }
    }

    /// Mark this function as a model stub
    pub fn model_stub(mut self) -> Self {
        self.attributes.is_model_stub = true;
        self
    }

    /// Record the declaration site
    pub fn declared_at(mut self, loc: Loc) -> Self {
        self.attributes.loc = Some(loc);
        self
    }

    /// Source location attached to subsequently emitted instructions
    pub fn set_loc(&mut self, loc: Loc) {
        self.loc = Some(loc);
    }

    fn fresh(&mut self, ty: IrType) -> ValueDef {
        let def = ValueDef::new(ValueId(self.next_value), ty);
        self.next_value += 1;
        def
    }

    fn emit(&mut self, op: RawOperator) {
        let inst = match self.loc {
            Some(loc) => RawInstruction::with_loc(op, loc),
            None => RawInstruction::new(op),
        };
        self.blocks[self.current].instructions.push(inst);
    }

    /// Append an empty block and return its id; the cursor does not move
    pub fn add_block(&mut self) -> BlockId {
        self.blocks.push(RawBlock::new());
        BlockId((self.blocks.len() - 1) as u32)
    }

    /// Move the instruction cursor to `block`
    pub fn switch_to(&mut self, block: BlockId) {
        assert!(block.index() < self.blocks.len(), "unknown block {block}");
        self.current = block.index();
    }

    /// Add a parameter to the entry block (a function parameter)
    pub fn param(&mut self, ty: IrType) -> ValueId {
        self.block_param(BlockId::ENTRY, ty)
    }

    /// Add a parameter to any block
    pub fn block_param(&mut self, block: BlockId, ty: IrType) -> ValueId {
        let def = self.fresh(ty);
        let value = def.value;
        self.blocks[block.index()].params.push(def);
        value
    }

    pub fn literal(&mut self, literal: Literal, ty: IrType) -> ValueId {
        let result = self.fresh(ty);
        let value = result.value;
        self.emit(RawOperator::Literal { result, literal });
        value
    }

    pub fn assign(&mut self, from: ValueId, ty: IrType) -> ValueId {
        let result = self.fresh(ty);
        let value = result.value;
        self.emit(RawOperator::Assign { result, from });
        value
    }

    pub fn binary(&mut self, op: BinOp, lhs: ValueId, rhs: ValueId, ty: IrType) -> ValueId {
        let result = self.fresh(ty);
        let value = result.value;
        self.emit(RawOperator::Binary {
            result,
            op,
            lhs,
            rhs,
        });
        value
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ValueId, ty: IrType) -> ValueId {
        let result = self.fresh(ty);
        let value = result.value;
        self.emit(RawOperator::Unary {
            result,
            op,
            operand,
        });
        value
    }

    pub fn field_read(&mut self, object: ValueId, field: impl Into<String>, ty: IrType) -> ValueId {
        let result = self.fresh(ty);
        let value = result.value;
        self.emit(RawOperator::FieldRead {
            result,
            object,
            field: field.into(),
        });
        value
    }

    pub fn field_write(&mut self, object: ValueId, field: impl Into<String>, value: ValueId) {
        self.emit(RawOperator::FieldWrite {
            object,
            field: field.into(),
            value,
        });
    }

    pub fn function_ref(&mut self, symbol: impl Into<String>) -> ValueId {
        let result = self.fresh(IrType::new("Function"));
        let value = result.value;
        self.emit(RawOperator::FunctionRef {
            result,
            symbol: symbol.into(),
        });
        value
    }

    pub fn call(&mut self, callee: impl Into<String>, args: Vec<ValueId>, ty: IrType) -> ValueId {
        let result = self.fresh(ty);
        let value = result.value;
        self.emit(RawOperator::CallDirect {
            result,
            callee: callee.into(),
            args,
        });
        value
    }

    pub fn call_indirect(&mut self, callee: ValueId, args: Vec<ValueId>, ty: IrType) -> ValueId {
        let result = self.fresh(ty);
        let value = result.value;
        self.emit(RawOperator::CallIndirect {
            result,
            callee,
            args,
        });
        value
    }

    /// Emit an instruction the translation does not model; canonicalization
    /// of the containing module will fail on it
    pub fn unknown(&mut self, name: impl Into<String>, ty: Option<IrType>) -> Option<ValueId> {
        let result = ty.map(|t| self.fresh(t));
        let value = result.as_ref().map(|d| d.value);
        self.emit(RawOperator::Unknown {
            result,
            name: name.into(),
        });
        value
    }

    fn terminate(&mut self, terminator: RawTerminator) {
        let block = &mut self.blocks[self.current];
        assert!(
            block.terminator.is_none(),
            "block bb{} already terminated",
            self.current
        );
        block.terminator = Some(terminator);
    }

    pub fn branch(&mut self, target: BlockId, args: Vec<ValueId>) {
        self.terminate(RawTerminator::Branch { target, args });
    }

    pub fn cond_branch(&mut self, condition: ValueId, true_target: BlockId, false_target: BlockId) {
        self.terminate(RawTerminator::CondBranch {
            condition,
            true_target,
            true_args: Vec::new(),
            false_target,
            false_args: Vec::new(),
        });
    }

    pub fn cond_branch_with_args(
        &mut self,
        condition: ValueId,
        true_target: BlockId,
        true_args: Vec<ValueId>,
        false_target: BlockId,
        false_args: Vec<ValueId>,
    ) {
        self.terminate(RawTerminator::CondBranch {
            condition,
            true_target,
            true_args,
            false_target,
            false_args,
        });
    }

    pub fn switch(&mut self, operand: ValueId, cases: Vec<(Literal, BlockId)>, default: BlockId) {
        self.terminate(RawTerminator::Switch {
            operand,
            cases,
            default,
        });
    }

    pub fn ret(&mut self, operand: Option<ValueId>) {
        self.terminate(RawTerminator::Return { operand });
    }

    pub fn unreachable(&mut self) {
        self.terminate(RawTerminator::Unreachable);
    }

    pub fn finish(self) -> RawFunction {
        RawFunction {
            symbol: self.symbol,
            return_type: self.return_type,
            blocks: self.blocks,
            attributes: self.attributes,
        }
    }
}
