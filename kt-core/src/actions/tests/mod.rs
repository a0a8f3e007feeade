mod describe_test;
mod events_test;
mod executor_test;

use kt_testutils::*;
use rstest::*;

use super::*;
