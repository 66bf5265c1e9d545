use std::{error, fmt, result};

pub type BoxedError = Box<dyn error::Error + Send + Sync + 'static>;
pub type BoxedErrorResult<T> = result::Result<T, BoxedError>;

pub type WhateverResult<T> = result::Result<T, snafu::Whatever>;

/// Displays an error together with its whole `source()` chain on one line
pub struct FmtCompactError<'e, E: ?Sized>(pub &'e E);

impl<'e, E> fmt::Display for FmtCompactError<'e, E>
where
    E: error::Error + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}", self.0))?;

        let mut error = self.0.source();
        while let Some(err) = error {
            f.write_str(": ")?;
            f.write_fmt(format_args!("{err}"))?;
            error = err.source();
        }

        Ok(())
    }
}

pub struct FmtCompactResult<'r, O, E>(pub &'r result::Result<O, E>);

impl<'r, O, E> fmt::Display for FmtCompactResult<'r, O, E>
where
    E: error::Error,
    O: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Ok(o) => o.fmt(f),
            Err(e) => FmtCompactError(e).fmt(f),
        }
    }
}

pub trait FmtCompact {
    type Report: fmt::Display;
    fn fmt_compact(self) -> Self::Report;
}

impl<'e, E> FmtCompact for &'e E
where
    E: error::Error + ?Sized,
{
    type Report = FmtCompactError<'e, E>;

    fn fmt_compact(self) -> Self::Report {
        FmtCompactError(self)
    }
}
