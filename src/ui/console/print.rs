use rustyline::history::History;
use rustyline::{Editor, ExternalPrinter as RLExternalPrinter, Helper};
use std::cell::RefCell;
use std::fmt::Display;

/// [`ExternalPrinter`] safely prints messages to stdout while `readline`
/// owns the terminal.
pub struct ExternalPrinter {
    printer: RefCell<Box<dyn RLExternalPrinter>>,
}

unsafe impl Send for ExternalPrinter {}

impl ExternalPrinter {
    pub fn new_for_editor<H: Helper, I: History>(
        editor: &mut Editor<H, I>,
    ) -> rustyline::Result<Self> {
        let external_p = editor.create_external_printer()?;
        Ok(Self {
            printer: RefCell::new(Box::new(external_p)),
        })
    }

    pub fn print(&self, msg: impl Display) {
        let msg = msg.to_string();
        self.printer
            .borrow_mut()
            .print(msg)
            .expect("external printer error");
    }

    pub fn println(&self, msg: impl Display) {
        let msg = format!("{msg}\n");
        self.print(msg)
    }
}

pub mod style {
    use crossterm::style::{Color, Stylize};
    use std::fmt::{Display, Formatter};

    const UNKNOWN_PLACEHOLDER: &str = "???";

    struct View<T: Display> {
        inner: Option<T>,
        color: Color,
    }

    impl<T: Display> Display for View<T> {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            let value = self
                .inner
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_string());

            f.write_fmt(format_args!("{}", value.with(self.color)))
        }
    }

    /// Construct structure declaration to display data of the same type
    /// (file paths, thread names, etc.).
    macro_rules! view_struct {
        ($name: ident, $color: expr) => {
            pub struct $name<T: Display>(View<T>);

            impl<T: Display> From<T> for $name<T> {
                fn from(value: T) -> Self {
                    Self(View {
                        inner: Some(value),
                        color: $color,
                    })
                }
            }

            impl<T: Display> From<Option<T>> for $name<T> {
                fn from(value: Option<T>) -> Self {
                    Self(View {
                        inner: value,
                        color: $color,
                    })
                }
            }

            impl<T: Display> Display for $name<T> {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    self.0.fmt(f)
                }
            }
        };
    }

    view_struct!(FilePathView, Color::Green);
    view_struct!(FunctionNameView, Color::Yellow);
    view_struct!(KeywordView, Color::Magenta);
    view_struct!(ImportantView, Color::Cyan);
    view_struct!(ErrorView, Color::Red);
}
