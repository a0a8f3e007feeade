
use kt_testutils::*;
use rstest::*;

use super::*;
