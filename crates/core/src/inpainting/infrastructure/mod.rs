pub mod cpu_inpainter;
mod navier_stokes;
mod telea;
