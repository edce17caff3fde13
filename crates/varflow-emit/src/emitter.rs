use anyhow::Result;
use colored::{ColoredString, Colorize};
use std::io::Write;

pub type EmitResult = Result<()>;

#[derive(Debug, Clone)]
pub struct EmitContext {
    pub indent_level: usize,
    pub indent_chars: String,
    pub use_colors: bool,
}

impl EmitContext {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_chars: "    ".to_string(),
            use_colors: true,
        }
    }

    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::new()
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn get_indent(&self) -> String {
        self.indent_chars.repeat(self.indent_level)
    }
}

impl Default for EmitContext {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Emitter {
    type Item: ?Sized;

    fn emit<W: Write>(
        &self,
        item: &Self::Item,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult;

    fn emit_to_string(&self, item: &Self::Item) -> Result<String> {
        let mut buffer = Vec::new();
        let mut context = EmitContext::plain();
        self.emit(item, &mut buffer, &mut context)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Colour roles used by the text report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Banner,
    Variable,
    Edge,
    Block,
    Summary,
}

impl Tone {
    fn paint(self, text: &str) -> ColoredString {
        match self {
            Tone::Banner => text.bright_cyan().bold(),
            Tone::Variable => text.green(),
            Tone::Edge => text.yellow(),
            Tone::Block => text.magenta(),
            Tone::Summary => text.bright_blue(),
        }
    }
}

pub struct EmitHelper;

impl EmitHelper {
    pub fn write_line<W: Write>(writer: &mut W, context: &EmitContext, text: &str) -> EmitResult {
        writeln!(writer, "{}{}", context.get_indent(), text)?;
        Ok(())
    }

    pub fn write_colored_line<W: Write>(
        writer: &mut W,
        context: &EmitContext,
        text: &str,
        tone: Tone,
    ) -> EmitResult {
        if context.use_colors {
            writeln!(writer, "{}{}", context.get_indent(), tone.paint(text))?;
        } else {
            Self::write_line(writer, context, text)?;
        }
        Ok(())
    }

    /// `# tag # body`, colouring only the tag.
    pub fn write_tagged<W: Write>(
        writer: &mut W,
        context: &EmitContext,
        tag: &str,
        body: &str,
        tone: Tone,
    ) -> EmitResult {
        let prefix = format!("# {} #", tag);
        if context.use_colors {
            writeln!(writer, "{}{} {}", context.get_indent(), tone.paint(&prefix), body)?;
        } else {
            writeln!(writer, "{}{} {}", context.get_indent(), prefix, body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_indentation() {
        let mut ctx = EmitContext::new();
        assert_eq!(ctx.get_indent(), "");

        ctx.indent();
        ctx.indent();
        assert_eq!(ctx.get_indent(), "        ");

        ctx.dedent();
        ctx.dedent();
        ctx.dedent();
        assert_eq!(ctx.indent_level, 0);
    }

    #[test]
    fn test_write_line_indented() {
        let mut buffer = Vec::new();
        let mut ctx = EmitContext::plain();
        ctx.indent();

        EmitHelper::write_line(&mut buffer, &ctx, "indented line").unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "    indented line\n");
    }

    #[test]
    fn test_tagged_line_without_colors() {
        let mut buffer = Vec::new();
        let ctx = EmitContext::plain();

        EmitHelper::write_tagged(&mut buffer, &ctx, "var", "x: %x 0", Tone::Variable).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "# var # x: %x 0\n");
    }

    #[test]
    fn test_colored_output_keeps_text() {
        let mut buffer = Vec::new();
        let ctx = EmitContext::new();

        EmitHelper::write_colored_line(&mut buffer, &ctx, "banner text", Tone::Banner).unwrap();
        EmitHelper::write_tagged(&mut buffer, &ctx, "edge", "a -> b", Tone::Edge).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("banner text"));
        assert!(output.contains("a -> b"));
    }
}
