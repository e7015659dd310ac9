use super::{GenPtr, Generator};
use crate::context::Context;
use crate::datatype::Number;
use crate::lang::RuntimeMsg;

/// `a + b + c` over strings.
#[derive(Debug)]
pub struct Concat {
    parts: Vec<GenPtr<String>>,
}

impl Concat {
    pub fn new(parts: Vec<GenPtr<String>>) -> Self {
        Self { parts }
    }
}

impl Generator<String> for Concat {
    fn value(&mut self, ctx: &mut Context) -> Result<String, RuntimeMsg> {
        let mut result = String::new();
        for part in self.parts.iter_mut() {
            result.push_str(&part.value(ctx)?);
        }
        Ok(result)
    }

    fn is_constant(&self) -> bool {
        self.parts.iter().all(|p| p.is_constant())
    }
}

/// `text[index]`: one character, or an empty string out of range.
#[derive(Debug)]
pub struct CharAtIndex {
    text: GenPtr<String>,
    index: GenPtr<Number>,
}

impl CharAtIndex {
    pub fn new(text: GenPtr<String>, index: GenPtr<Number>) -> Self {
        Self { text, index }
    }
}

impl Generator<String> for CharAtIndex {
    fn value(&mut self, ctx: &mut Context) -> Result<String, RuntimeMsg> {
        let text = self.text.value(ctx)?;
        let index = self.index.value(ctx)?;
        if index.is_nan() || index.to_i64() < 0 {
            return Ok(String::new());
        }
        Ok(text
            .chars()
            .nth(index.to_i64() as usize)
            .map(|c| c.to_string())
            .unwrap_or_default())
    }

    fn is_constant(&self) -> bool {
        self.text.is_constant() && self.index.is_constant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Constant;

    #[test]
    fn characters_by_index() {
        let mut ctx = Context::new("/");
        let text = || -> GenPtr<String> { Box::new(Constant::new("żółw".to_string())) };
        let at = |i: i64| -> GenPtr<Number> { Box::new(Constant::new(Number::Int(i))) };
        assert_eq!(CharAtIndex::new(text(), at(1)).value(&mut ctx).unwrap(), "ó");
        assert_eq!(CharAtIndex::new(text(), at(4)).value(&mut ctx).unwrap(), "");
        let mut concat = Concat::new(vec![text(), text()]);
        assert!(concat.is_constant());
        assert_eq!(concat.value(&mut ctx).unwrap(), "żółwżółw");
    }
}
