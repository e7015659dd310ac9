use super::Generator;
use crate::context::{Attribute, Context, FrameId};
use crate::datatype::{Number, Period, Time};
use crate::lang::RuntimeMsg;
use crate::processing::paths;

/// File attribute of the element loaded into a file frame.
///
/// One struct serves every result type; the parser picks the implementation
/// matching [Attribute::value_type].
#[derive(Debug, Clone, Copy)]
pub struct AttributeValue {
    frame: FrameId,
    attribute: Attribute,
}

impl AttributeValue {
    pub fn new(frame: FrameId, attribute: Attribute) -> Self {
        Self { frame, attribute }
    }

    fn mismatch(&self, wanted: &str) -> RuntimeMsg {
        RuntimeMsg(format!(
            "attribute {:?} does not hold a {}",
            self.attribute, wanted
        ))
    }
}

impl Generator<String> for AttributeValue {
    fn value(&mut self, ctx: &mut Context) -> Result<String, RuntimeMsg> {
        let path = &ctx.frame(self.frame).path;
        Ok(match self.attribute {
            Attribute::Name => paths::name(path),
            Attribute::FullName => paths::fullname(path),
            Attribute::Extension => paths::extension(path).to_lowercase(),
            Attribute::Path => path.clone(),
            Attribute::Parent => paths::parent(path),
            Attribute::Drive => paths::drive(path),
            _ => return Err(self.mismatch("string")),
        })
    }
}

impl Generator<bool> for AttributeValue {
    fn value(&mut self, ctx: &mut Context) -> Result<bool, RuntimeMsg> {
        let attribute = self.attribute;
        let data = ctx.file_data(self.frame);
        Ok(match attribute {
            Attribute::Exists => data.exists,
            Attribute::IsFile => data.is_file,
            Attribute::IsDirectory => data.is_directory,
            Attribute::Hidden => data.hidden,
            Attribute::Readonly => data.readonly,
            Attribute::Empty => data.exists && data.empty,
            Attribute::Archive | Attribute::Compressed | Attribute::Encrypted => false,
            _ => return Err(self.mismatch("bool")),
        })
    }
}

impl Generator<Number> for AttributeValue {
    fn value(&mut self, ctx: &mut Context) -> Result<Number, RuntimeMsg> {
        match self.attribute {
            Attribute::Depth => Ok(ctx.frame(self.frame).depth),
            Attribute::Size => {
                let data = ctx.file_data(self.frame);
                Ok(if data.exists { data.size } else { Number::Int(-1) })
            }
            _ => Err(self.mismatch("number")),
        }
    }
}

impl Generator<Time> for AttributeValue {
    fn value(&mut self, ctx: &mut Context) -> Result<Time, RuntimeMsg> {
        let attribute = self.attribute;
        let data = ctx.file_data(self.frame);
        Ok(match attribute {
            Attribute::Access => data.access,
            Attribute::Change => data.change,
            Attribute::Creation => data.creation,
            Attribute::Modification => data.modification,
            _ => return Err(self.mismatch("time")),
        })
    }
}

impl Generator<Period> for AttributeValue {
    fn value(&mut self, ctx: &mut Context) -> Result<Period, RuntimeMsg> {
        if self.attribute != Attribute::Lifetime {
            return Err(self.mismatch("period"));
        }
        let creation = ctx.file_data(self.frame).creation;
        if creation.is_never() {
            return Ok(Period::default());
        }
        Ok(Time::now().difference(&creation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FrameKind;

    #[test]
    fn path_attributes() {
        let mut ctx = Context::new("/data");
        let frame = ctx.open_frame(FrameKind::File);
        ctx.set_file(frame, "photos/Beach.JPG".into(), 0);
        let mut gen = |attribute| -> String {
            Generator::<String>::value(&mut AttributeValue::new(frame, attribute), &mut ctx).unwrap()
        };
        assert_eq!(gen(Attribute::Name), "Beach");
        assert_eq!(gen(Attribute::Extension), "jpg");
        assert_eq!(gen(Attribute::Parent), "/data/photos");
        assert_eq!(gen(Attribute::Path), "/data/photos/Beach.JPG");
    }

    #[test]
    fn missing_file() {
        let mut ctx = Context::new("/nonexistent-location-for-tests");
        let frame = ctx.open_frame(FrameKind::File);
        ctx.set_file(frame, "nothing.txt".into(), 0);
        let mut size = AttributeValue::new(frame, Attribute::Size);
        assert_eq!(Generator::<Number>::value(&mut size, &mut ctx).unwrap(), Number::Int(-1));
        let mut exists = AttributeValue::new(frame, Attribute::Exists);
        assert!(!Generator::<bool>::value(&mut exists, &mut ctx).unwrap());
    }
}
