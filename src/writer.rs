use std::io::Write;

/// Write target with ANSI cursor control for in-place frame replacement.
///
/// Counts the newlines it emits so the board knows how tall the live frame
/// is; [`clear_frame`](FrameWriter::clear_frame) moves the cursor back to the
/// top of the previous frame and wipes everything below it. Lines written
/// before the live frame (drained log output) are never counted against the
/// frame height, so they survive in scrollback.
pub struct FrameWriter<'a> {
    target: &'a mut dyn Write,
    frame_lines: usize,
}

impl<'a> FrameWriter<'a> {
    pub(crate) fn new(target: &'a mut dyn Write, frame_lines: usize) -> Self {
        Self {
            target,
            frame_lines,
        }
    }

    pub(crate) fn clear_frame(&mut self) -> Result<(), std::io::Error> {
        let lines_drawn = self.frame_lines;
        if lines_drawn > 0 {
            write!(self.target, "\r\x1b[{}A\x1b[2K\x1b[J", lines_drawn)?;
            self.target.flush()?;
        }
        self.frame_lines = 0;
        Ok(())
    }

    pub(crate) fn frame_lines(&self) -> usize {
        self.frame_lines
    }
}

impl<'a> Write for FrameWriter<'a> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let newlines = buf.iter().filter(|&&b| b == b'\n').count();
        self.frame_lines += newlines;
        self.target.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.target.flush()
    }
}
