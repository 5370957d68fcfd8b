//! SuperCluster protocol contract bindings.
//!
//! Includes the contracts a staking client writes to:
//! - SuperCluster (deposit and withdrawal requests, routed through a pilot)
//! - wsToken (wraps the rebasing sToken into fixed-balance shares)
//! - WithdrawManager (withdrawal request bookkeeping and claims)

use alloy_sol_types::sol;

sol! {
    /// SuperCluster - entry point for deposits and withdrawal requests
    #[sol(rpc)]
    interface ISuperCluster {
        /// Emitted when a deposit is routed to a pilot
        event TokenDeposited(
            address indexed user,
            address indexed pilot,
            address indexed token,
            uint256 amount
        );

        /// Emitted when a withdrawal request is queued in the WithdrawManager
        event TokenWithdrawn(
            uint256 indexed requestId,
            address indexed user,
            address indexed pilot,
            address token,
            uint256 amount
        );

        /// Deposit `amount` of `token` through `pilot`, minting sToken to the caller
        function deposit(address pilot, address token, uint256 amount) external;

        /// Burn `amount` of sToken and queue a withdrawal of `token` through `pilot`
        function withdraw(address pilot, address token, uint256 amount) external returns (uint256 requestId);
    }

    /// wsToken - share-based wrapper around sToken
    #[sol(rpc)]
    interface IWsToken {
        /// Wrap sToken into wsToken shares
        function wrap(uint256 sTokenAmount) external returns (uint256);

        /// Unwrap wsToken shares back into sToken
        function unwrap(uint256 wsTokenAmount) external returns (uint256);
    }

    /// WithdrawManager - holds queued withdrawal requests until they can be claimed
    #[sol(rpc)]
    interface IWithdrawManager {
        /// Withdrawal request record
        #[derive(Debug)]
        struct WithdrawRequest {
            address user;
            uint256 amount;
            uint256 claimableAt;
            bool claimed;
        }

        /// Emitted when a request is claimed
        event WithdrawClaimed(
            uint256 indexed requestId,
            address indexed user,
            uint256 amount
        );

        /// All request ids ever created for `user`
        function getUserRequestIds(address user) external view returns (uint256[] memory);

        /// Look up a single request
        function getRequest(uint256 requestId) external view returns (WithdrawRequest memory);

        /// Claim a request whose exit delay has elapsed
        function claim(uint256 requestId) external;
    }
}
