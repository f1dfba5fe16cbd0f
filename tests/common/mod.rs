//! Shared test schema: layout types and the Calculator service

#![allow(dead_code)]

use lidl::{Builder, Decode, Result, Vector, F32, I32, U16, U32, U64, U8};

lidl::lidl_struct! {
    pub struct Vec3f(size = 12, align = 4) {
        [0] x: F32 => set_x,
        [4] y: F32 => set_y,
        [8] z: F32 => set_z,
    }
}

lidl::lidl_struct! {
    pub struct Foo(size = 32, align = 8) {
        [0] x: I32 => set_x,
        [8] y: U64 => set_y,
        [16] vec: Vec3f => set_vec,
    }
}

lidl::lidl_enum! {
    pub enum MaybeIntAlternatives: i8 {
        VAL = 0,
        NONE = 1,
    }
}

lidl::lidl_union! {
    pub union MaybeInt(size = 8, align = 4) {
        [0] alternative: MaybeIntAlternatives;
        [4] val: I32 => create_val = VAL,
        [4] none: I32 => create_none = NONE,
    }
}

lidl::lidl_struct! {
    /// Named weight, passed by reference
    pub struct Labeled(size = 4, align = 2, reference) {
        [0] name: lidl::String => set_name,
        [2] weight: U16 => set_weight,
    }
}

lidl::lidl_enum! {
    pub enum CalculatorProcedure: u8 {
        ADD = 0,
        ANSWER = 1,
        ECHO = 2,
        SUM = 3,
        WEIGH = 4,
    }
}

lidl::lidl_struct! {
    pub struct AddParams(size = 8, align = 4) {
        [0] a: I32 => set_a,
        [4] b: I32 => set_b,
    }
}

lidl::lidl_struct! {
    pub struct AnswerParams(size = 1, align = 1) {}
}

lidl::lidl_struct! {
    pub struct EchoParams(size = 2, align = 2) {
        [0] text: lidl::String => set_text,
    }
}

lidl::lidl_struct! {
    pub struct SumParams(size = 2, align = 2) {
        [0] data: Vector<U8> => set_data,
    }
}

lidl::lidl_struct! {
    pub struct WeighParams(size = 2, align = 2) {
        [0] item: Labeled => set_item,
    }
}

lidl::lidl_struct! {
    pub struct AddResults(size = 4, align = 4) {
        [0] ret0: I32 => set_ret0,
    }
}

lidl::lidl_struct! {
    pub struct AnswerResults(size = 4, align = 4) {
        [0] ret0: I32 => set_ret0,
    }
}

lidl::lidl_struct! {
    pub struct EchoResults(size = 2, align = 2) {
        [0] ret0: lidl::String => set_ret0,
    }
}

lidl::lidl_struct! {
    pub struct SumResults(size = 4, align = 4) {
        [0] ret0: U32 => set_ret0,
    }
}

lidl::lidl_struct! {
    pub struct WeighResults(size = 2, align = 2) {
        [0] ret0: U16 => set_ret0,
    }
}

lidl::lidl_union! {
    pub union CalculatorCall(size = 12, align = 4) {
        [0] alternative: CalculatorProcedure;
        [4] add: AddParams => create_add = ADD,
        [4] answer: AnswerParams => create_answer = ANSWER,
        [4] echo: EchoParams => create_echo = ECHO,
        [4] sum: SumParams => create_sum = SUM,
        [4] weigh: WeighParams => create_weigh = WEIGH,
    }
}

lidl::lidl_union! {
    pub union CalculatorReturn(size = 8, align = 4) {
        [0] alternative: CalculatorProcedure;
        [4] add: AddResults => create_add = ADD,
        [4] answer: AnswerResults => create_answer = ANSWER,
        [4] echo: EchoResults => create_echo = ECHO,
        [4] sum: SumResults => create_sum = SUM,
        [4] weigh: WeighResults => create_weigh = WEIGH,
    }
}

lidl::lidl_service! {
    pub service Calculator {
        tag: CalculatorProcedure,
        call: CalculatorCall,
        return: CalculatorReturn,
        client: CalculatorClient,
        handler: CalculatorHandler,
        server: CalculatorServer,
        procedures {
            Add = ADD => fn add(a: i32, b: i32) -> i32 as I32 {
                params: AddParams, call: add / create_add,
                results: AddResults, return: add / create_add,
            }
            Answer = ANSWER => fn answer() -> i32 as I32 {
                params: AnswerParams, call: answer / create_answer,
                results: AnswerResults, return: answer / create_answer,
            }
            Echo = ECHO => fn echo(text: &str) -> std::string::String as lidl::String {
                params: EchoParams, call: echo / create_echo,
                results: EchoResults, return: echo / create_echo,
            }
            Sum = SUM => fn sum(data: &[u8]) -> u32 as U32 {
                params: SumParams, call: sum / create_sum,
                results: SumResults, return: sum / create_sum,
            }
            Weigh = WEIGH => fn weigh(item: Labeled) -> u16 as U16 {
                params: WeighParams, call: weigh / create_weigh,
                results: WeighResults, return: weigh / create_weigh,
            }
        }
    }
}

/// Reference handler used by the in-process and UDP tests
#[derive(Default)]
pub struct Calc {
    pub calls: usize,
}

impl CalculatorHandler for Calc {
    fn add(&mut self, params: AddParams, _builder: &mut Builder) -> Result<i32> {
        self.calls += 1;
        Ok(params.a()?.get().wrapping_add(params.b()?.get()))
    }

    fn answer(&mut self, _params: AnswerParams, _builder: &mut Builder) -> Result<i32> {
        self.calls += 1;
        Ok(42)
    }

    fn echo(&mut self, params: EchoParams, _builder: &mut Builder) -> Result<std::string::String> {
        self.calls += 1;
        Ok(params.text()?.value()?.to_uppercase())
    }

    fn sum(&mut self, params: SumParams, _builder: &mut Builder) -> Result<u32> {
        self.calls += 1;
        let data = params.data()?.decode()?;
        Ok(data.iter().map(|byte| *byte as u32).sum())
    }

    fn weigh(&mut self, params: WeighParams, _builder: &mut Builder) -> Result<u16> {
        self.calls += 1;
        let item = params.item()?;
        let bonus = item.name()?.len() as u16;
        Ok(item.weight()?.get() + bonus)
    }
}
