// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::Write;

use crate::Error;
use crate::Layout;
use crate::append::Append;
use crate::record::LogEvent;

/// An appender that prints log events to stdout.
///
/// By default, events are rendered by the layout of their category.
///
/// # Examples
///
/// ```
/// use logroute::append::Stdout;
///
/// let stdout_appender = Stdout::default();
/// ```
#[derive(Debug, Default)]
pub struct Stdout {
    layout: Option<Box<dyn Layout>>,
}

impl Stdout {
    /// Set the layout overriding the category layout.
    ///
    /// # Examples
    ///
    /// ```
    /// use logroute::append::Stdout;
    /// use logroute::layout::MessagePassThroughLayout;
    ///
    /// let stdout_appender = Stdout::default().with_layout(MessagePassThroughLayout::default());
    /// ```
    pub fn with_layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = Some(layout.into());
        self
    }
}

impl Append for Stdout {
    fn append(&self, _: &LogEvent, text: &str) -> Result<(), Error> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}").map_err(Error::from_io_error)
    }

    fn layout(&self) -> Option<&dyn Layout> {
        self.layout.as_deref()
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stdout().flush().map_err(Error::from_io_error)
    }
}

/// An appender that prints log events to stderr.
///
/// # Examples
///
/// ```
/// use logroute::append::Stderr;
///
/// let stderr_appender = Stderr::default();
/// ```
#[derive(Debug, Default)]
pub struct Stderr {
    layout: Option<Box<dyn Layout>>,
}

impl Stderr {
    /// Set the layout overriding the category layout.
    ///
    /// # Examples
    ///
    /// ```
    /// use logroute::append::Stderr;
    /// use logroute::layout::MessagePassThroughLayout;
    ///
    /// let stderr_appender = Stderr::default().with_layout(MessagePassThroughLayout::default());
    /// ```
    pub fn with_layout(mut self, layout: impl Into<Box<dyn Layout>>) -> Self {
        self.layout = Some(layout.into());
        self
    }
}

impl Append for Stderr {
    fn append(&self, _: &LogEvent, text: &str) -> Result<(), Error> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{text}").map_err(Error::from_io_error)
    }

    fn layout(&self) -> Option<&dyn Layout> {
        self.layout.as_deref()
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stderr().flush().map_err(Error::from_io_error)
    }
}
