//! Assembler Adapter - 片段拼接

mod byte_concat_assembler;

pub use byte_concat_assembler::ByteConcatAssembler;
