/*
 * Test utilities for gettemp
 *
 * Builds fixture hwmon trees that mirror the layout of /sys/class/hwmon.
 */

#[cfg(test)]
pub mod test_utils {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Root of the fixture hwmon class directory inside `dir`
    pub fn hwmon_root(dir: &TempDir) -> PathBuf {
        dir.path().join("sys/class/hwmon")
    }

    /// Writes one attribute file, creating parent directories as needed
    pub fn write_attr(dir: &Path, name: &str, content: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn set_mode(path: &Path, mode: u32) {
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    /// Creates a temporary directory with a mock hwmon structure:
    ///
    /// - hwmon0 `coretemp`: temp1 (45.5, with limits), temp2 (41)
    /// - hwmon1 `amdgpu`: in0, fan1, temp1 (52), write-only temp2, power1, pwm1
    /// - hwmon2 `drivetemp`: temp1 with unparsable content
    /// - hwmon3 `coretemp`: temp3 (47)
    /// - hwmon4 `acpitz`: name only, no sensors
    /// - hwmon5 `k10temp`: attributes under device/
    /// - hwmon10 `amdgpu`: temp1 (99)
    pub fn create_mock_hwmon_dir() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = hwmon_root(&temp_dir);

        let hwmon0 = root.join("hwmon0");
        write_attr(&hwmon0, "name", "coretemp\n");
        write_attr(&hwmon0, "temp1_input", "45500\n");
        write_attr(&hwmon0, "temp1_max", "80000\n");
        write_attr(&hwmon0, "temp1_crit", "100000\n");
        write_attr(&hwmon0, "temp1_crit_alarm", "0\n");
        write_attr(&hwmon0, "temp1_label", "Package id 0\n");
        write_attr(&hwmon0, "temp2_input", "41000\n");

        let hwmon1 = root.join("hwmon1");
        write_attr(&hwmon1, "name", "amdgpu\n");
        write_attr(&hwmon1, "in0_input", "850\n");
        write_attr(&hwmon1, "fan1_input", "1200\n");
        write_attr(&hwmon1, "temp1_input", "52000\n");
        let temp2 = write_attr(&hwmon1, "temp2_input", "60000\n");
        set_mode(&temp2, 0o200);
        write_attr(&hwmon1, "power1_average", "35000000\n");
        write_attr(&hwmon1, "pwm1", "128\n");

        let hwmon2 = root.join("hwmon2");
        write_attr(&hwmon2, "name", "drivetemp\n");
        write_attr(&hwmon2, "temp1_input", "n/a\n");

        let hwmon3 = root.join("hwmon3");
        write_attr(&hwmon3, "name", "coretemp\n");
        write_attr(&hwmon3, "temp3_input", "47000\n");

        let hwmon4 = root.join("hwmon4");
        write_attr(&hwmon4, "name", "acpitz\n");

        let hwmon5 = root.join("hwmon5");
        write_attr(&hwmon5.join("device"), "name", "k10temp\n");
        write_attr(&hwmon5.join("device"), "temp1_input", "38250\n");

        let hwmon10 = root.join("hwmon10");
        write_attr(&hwmon10, "name", "amdgpu\n");
        write_attr(&hwmon10, "temp1_input", "99000\n");

        temp_dir
    }
}
