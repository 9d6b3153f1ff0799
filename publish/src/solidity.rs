//! Definitions of Solidity functions and events used during deployment

use alloy_sol_types::sol;

sol! {
    /// The ERC1967 proxy factory
    interface IERC1967Factory {
        function deployAndCall(address implementation, address admin, bytes calldata data) external payable returns (address proxy);

        event Deployed(address indexed proxy, address indexed implementation, address indexed admin);
    }

    /// Contracts whose initializer only takes an owner
    interface IOwnable {
        function initialize(address owner) external;
    }

    /// Contracts initialized with an owner and a single amount
    interface IOwnableWithAmount {
        function initialize(address owner, uint256 amount) external;
    }

    interface IContractRegistry {
        function initialize(address owner, bytes32[] identifiers) external;
    }

    interface IGiftableToken {
        function initialize(string name, string symbol, uint8 decimals, address owner, uint256 expiresAt) external;
    }

    interface IOracleQuoter {
        function initialize(address owner, address baseCurrency) external;
    }

    interface IPeriodSimple {
        function initialize(address owner, address poker) external;
    }

    interface IProtocolFeeController {
        function initialize(address owner, uint256 initialFee, address initialRecipient) external;
    }

    interface ISplitter {
        function initialize(address owner, address[] accounts, uint32[] percentAllocations) external;
    }

    interface ITokenUniqueSymbolIndex {
        function initialize(address owner, address[] initialTokens, bytes32[] initialSymbols) external;
    }

    interface ISwapPool {
        function initialize(
            string name,
            string symbol,
            uint8 decimals,
            address owner,
            address feePolicy,
            address feeAddress,
            address tokenRegistry,
            address tokenLimiter,
            address quoter,
            bool feesDecoupled,
            address protocolFeeController
        ) external;
    }
}
