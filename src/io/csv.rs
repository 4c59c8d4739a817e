use std::io::{self, Write};

use crate::sim::runner::Sample;

/// Write trajectory samples as CSV.
///
/// Columns: time, pos_x, pos_y, pos_z, vel_x, vel_y, vel_z, tilt_deg,
///          mass, fuel, com_x, com_y, com_z, active, steered, thrust, phase
pub fn write_trajectory<W: Write>(writer: &mut W, samples: &[Sample]) -> io::Result<()> {
    writeln!(
        writer,
        "time,pos_x,pos_y,pos_z,vel_x,vel_y,vel_z,tilt_deg,\
         mass,fuel,com_x,com_y,com_z,active,steered,thrust,phase"
    )?;

    for s in samples {
        writeln!(
            writer,
            "{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.3},\
             {:.2},{:.2},{:.4},{:.4},{:.4},{},{},{:.1},{}",
            s.time,
            s.pos.x, s.pos.y, s.pos.z,
            s.vel.x, s.vel.y, s.vel.z,
            s.tilt_deg,
            s.mass,
            s.fuel,
            s.com.x, s.com.y, s.com.z,
            s.active_engines,
            s.steered_engines,
            s.thrust,
            if s.phase.is_launched() { "launched" } else { "idle" },
        )?;
    }

    Ok(())
}

pub fn write_trajectory_file(path: &str, samples: &[Sample]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trajectory(&mut file, samples)
}
